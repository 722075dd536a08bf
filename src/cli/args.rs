//! CLI argument definitions using clap
//!
//! Commands:
//! - hireguard validate --schema <NAME> [--input <path>] [--config <path>]
//! - hireguard schemas [--model <MODEL>] [--config <path>]
//! - hireguard models [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hireguard - schema validation for recruiting data
#[derive(Parser, Debug)]
#[command(name = "hireguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a JSON document against a named schema
    Validate {
        /// Schema name, e.g. CandidateCreateInput
        #[arg(long)]
        schema: String,

        /// Input file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List registered schema names
    Schemas {
        /// Only schemas derived from this model
        #[arg(long)]
        model: Option<String>,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize the model catalog
    Models {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from([
            "hireguard",
            "validate",
            "--schema",
            "UserWhereUniqueInput",
            "--input",
            "user.json",
        ])
        .unwrap();
        match cli.command {
            Command::Validate { schema, input, config } => {
                assert_eq!(schema, "UserWhereUniqueInput");
                assert_eq!(input, Some(PathBuf::from("user.json")));
                assert!(config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_validate_requires_schema() {
        assert!(Cli::try_parse_from(["hireguard", "validate"]).is_err());
    }
}
