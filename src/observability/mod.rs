//! Observability for hireguard
//!
//! - Structured logging (one JSON object per line, on stderr)
//! - Scope-based begin/complete/failed events
//!
//! Logging is synchronous and never affects validation results.
//!
//! ```ignore
//! use hireguard::observability::{Logger, ObservationScope};
//!
//! Logger::info("MODEL_FRAGMENT_LOADED", &[("models", "3")]);
//!
//! let scope = ObservationScope::new("SCHEMA_REGISTRY_BUILD");
//! // ... build ...
//! scope.complete();
//! ```

mod logger;
mod scope;

pub use logger::{Logger, Severity};
pub use scope::ObservationScope;
