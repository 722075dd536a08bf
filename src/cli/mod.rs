//! Command-line interface for hireguard
//!
//! - validate: check one JSON input against a named schema
//! - schemas: list registered schema names
//! - models: summarize the model catalog

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{models, run, run_command, schemas, validate, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
