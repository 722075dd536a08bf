//! hireguard - validation and query-filter algebra for a recruiting data model
//!
//! - `model`: the declarative catalog (fields, relations, unique keys, enums)
//! - `schema`: every schema the catalog implies, plus the validator
//! - `observability`: structured JSON logging
//! - `cli`: the `hireguard` command

pub mod cli;
pub mod model;
pub mod observability;
pub mod schema;
