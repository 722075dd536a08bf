//! Validation limits

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};

fn default_max_depth() -> usize {
    128
}

/// Tunables applied by a `Validator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum number of nested containers (objects and arrays)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl ValidationConfig {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn validate(&self) -> SchemaResult<()> {
        if self.max_depth == 0 {
            return Err(SchemaError::malformed_model(
                "validation.max_depth",
                "max_depth must be greater than 0",
            ));
        }
        Ok(())
    }
}
