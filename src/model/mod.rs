//! Declarative data model consumed by the validator algebra
//!
//! A `Catalog` lists enums and models exactly as a schema generator would
//! emit them. It is either the built-in recruiting model
//! (`Catalog::recruiting()`) or merged from JSON fragments by `ModelLoader`.

mod catalog;
mod loader;
mod types;

pub use catalog::PHONE_PATTERN;
pub use loader::ModelLoader;
pub use types::{
    Cardinality, Catalog, Constraint, ConstraintKind, DefaultRule, EnumDef, ModelDef,
    RelationField, ScalarField, ScalarKind, UniqueKey,
};
