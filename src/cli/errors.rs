//! CLI-specific error types

use std::fmt;
use std::io;

use crate::schema::{SchemaError, ValidationIssue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdin/stdout)
    IoError,
    /// Input is not valid JSON
    InvalidInput,
    /// Model catalog could not be loaded or built
    ModelError,
    /// No schema or model with the requested name
    NotFound,
    /// Input was rejected by the schema
    Rejected,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "HIRE_CLI_CONFIG_ERROR",
            Self::IoError => "HIRE_CLI_IO_ERROR",
            Self::InvalidInput => "HIRE_CLI_INVALID_INPUT",
            Self::ModelError => "HIRE_CLI_MODEL_ERROR",
            Self::NotFound => "HIRE_CLI_NOT_FOUND",
            Self::Rejected => "HIRE_CLI_REJECTED",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    issues: Vec<ValidationIssue>,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::NotFound, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Validation issues behind a rejection
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::Rejected(rejection) => Self {
                code: CliErrorCode::Rejected,
                message: format!("input rejected by {}", rejection.schema),
                issues: rejection.issues().to_vec(),
            },
            SchemaError::UnknownSchema(name) => {
                Self::not_found(format!("schema '{}' is not registered", name))
            }
            other => Self::new(
                CliErrorCode::ModelError,
                format!("{}: {}", other.code(), other),
            ),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
