//! Validation issue and schema error types
//!
//! Issue codes:
//! - HIRE_TYPE_MISMATCH (type)
//! - HIRE_CONSTRAINT_VIOLATION (constraint)
//! - HIRE_MISSING_FIELD, HIRE_UNRECOGNIZED_KEY, HIRE_NO_MATCHING_VARIANT,
//!   HIRE_DEPTH_EXCEEDED (shape)
//! - HIRE_UNIQUE_KEY_MISSING (uniqueness shape)
//!
//! Rejections are ordinary values: a `ValidationError` lists every issue
//! found, each tagged with the path it occurred at. `SchemaError` is reserved
//! for construction-time mistakes plus a wrapper for rejections.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Broad class of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Value is not of the declared primitive type
    Type,
    /// Right type, but a declared rule failed
    Constraint,
    /// Missing or unexpected keys, unmatched union
    Shape,
    /// Where-unique input names no unique key
    UniqueShape,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueCategory::Type => "type",
            IssueCategory::Constraint => "constraint",
            IssueCategory::Shape => "shape",
            IssueCategory::UniqueShape => "unique_shape",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    TypeMismatch,
    ConstraintViolation,
    MissingField,
    UnrecognizedKey,
    NoMatchingVariant,
    DepthExceeded,
    UniqueKeyMissing,
}

impl IssueCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            IssueCode::TypeMismatch => "HIRE_TYPE_MISMATCH",
            IssueCode::ConstraintViolation => "HIRE_CONSTRAINT_VIOLATION",
            IssueCode::MissingField => "HIRE_MISSING_FIELD",
            IssueCode::UnrecognizedKey => "HIRE_UNRECOGNIZED_KEY",
            IssueCode::NoMatchingVariant => "HIRE_NO_MATCHING_VARIANT",
            IssueCode::DepthExceeded => "HIRE_DEPTH_EXCEEDED",
            IssueCode::UniqueKeyMissing => "HIRE_UNIQUE_KEY_MISSING",
        }
    }

    pub fn category(&self) -> IssueCategory {
        match self {
            IssueCode::TypeMismatch => IssueCategory::Type,
            IssueCode::ConstraintViolation => IssueCategory::Constraint,
            IssueCode::MissingField
            | IssueCode::UnrecognizedKey
            | IssueCode::NoMatchingVariant
            | IssueCode::DepthExceeded => IssueCategory::Shape,
            IssueCode::UniqueKeyMissing => IssueCategory::UniqueShape,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for IssueCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside the validated input.
///
/// Displays as `jobs[0].department.title`; the empty path is `$root`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Child path for an object key
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    /// Child path for an array element
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$root");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single problem found in an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: FieldPath,
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: FieldPath, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
        }
    }

    pub fn type_mismatch(path: FieldPath, expected: &str, actual: &str) -> Self {
        Self::new(
            path,
            IssueCode::TypeMismatch,
            format!("expected {}, got {}", expected, actual),
        )
    }

    pub fn constraint(path: FieldPath, message: impl Into<String>) -> Self {
        Self::new(path, IssueCode::ConstraintViolation, message)
    }

    pub fn missing_field(path: FieldPath) -> Self {
        Self::new(path, IssueCode::MissingField, "required field is missing")
    }

    pub fn unrecognized_key(path: FieldPath) -> Self {
        Self::new(path, IssueCode::UnrecognizedKey, "unrecognized key")
    }

    pub fn no_matching_variant(path: FieldPath, actual: &str) -> Self {
        Self::new(
            path,
            IssueCode::NoMatchingVariant,
            format!("no union variant accepts {}", actual),
        )
    }

    pub fn depth_exceeded(path: FieldPath, max_depth: usize) -> Self {
        Self::new(
            path,
            IssueCode::DepthExceeded,
            format!("nesting deeper than {} levels", max_depth),
        )
    }

    pub fn unique_key_missing(path: FieldPath, keys: &[String]) -> Self {
        Self::new(
            path,
            IssueCode::UniqueKeyMissing,
            format!("expected at least one of: {}", keys.join(", ")),
        )
    }

    pub fn category(&self) -> IssueCategory {
        self.code.category()
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// Every issue found while validating one input against one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub schema: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(schema: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        Self {
            schema: schema.into(),
            issues,
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Issues reported at the given displayed path (e.g. `"phone"`)
    pub fn issues_at(&self, path: &str) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.path.to_string() == path)
            .collect()
    }

    pub fn has_code(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation issue(s) against {}",
            self.issues.len(),
            self.schema
        )?;
        if let Some(first) = self.issues.first() {
            write!(f, ": {}", first)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Schema construction and lookup errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The input was rejected; carries every issue found.
    #[error("{0}")]
    Rejected(ValidationError),

    /// No schema registered under the requested name.
    #[error("schema '{0}' is not registered")]
    UnknownSchema(String),

    /// The same name was declared twice while building a registry.
    #[error("schema '{0}' declared twice")]
    DuplicateSchema(String),

    /// A lazy reference points at a name that was never declared.
    #[error("schema '{from}' references undeclared schema '{target}'")]
    UnresolvedReference { from: String, target: String },

    /// A schema reaches itself without descending into the input.
    #[error("schema '{0}' refers to itself without an enclosing container")]
    UnguardedRecursion(String),

    /// The catalog describes an impossible model.
    #[error("invalid model '{model}': {reason}")]
    InvalidModel { model: String, reason: String },

    /// A pattern constraint does not compile.
    #[error("invalid pattern on {model}.{field}: {reason}")]
    InvalidPattern {
        model: String,
        field: String,
        reason: String,
    },

    /// A catalog fragment or config file could not be read or parsed.
    #[error("malformed model file '{path}': {reason}")]
    MalformedModel { path: String, reason: String },
}

impl SchemaError {
    pub fn invalid_model(model: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidModel {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_pattern(
        model: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SchemaError::InvalidPattern {
            model: model.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_model(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedModel {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Issues of a rejection; empty for construction errors.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            SchemaError::Rejected(err) => err.issues(),
            _ => &[],
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, SchemaError::Rejected(_))
    }

    /// Stable code for reporting
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Rejected(_) => "HIRE_VALIDATION_FAILED",
            SchemaError::UnknownSchema(_) => "HIRE_UNKNOWN_SCHEMA",
            SchemaError::DuplicateSchema(_) => "HIRE_DUPLICATE_SCHEMA",
            SchemaError::UnresolvedReference { .. } => "HIRE_UNRESOLVED_REFERENCE",
            SchemaError::UnguardedRecursion(_) => "HIRE_UNGUARDED_RECURSION",
            SchemaError::InvalidModel { .. } => "HIRE_INVALID_MODEL",
            SchemaError::InvalidPattern { .. } => "HIRE_INVALID_PATTERN",
            SchemaError::MalformedModel { .. } => "HIRE_MALFORMED_MODEL",
        }
    }
}

impl From<ValidationError> for SchemaError {
    fn from(err: ValidationError) -> Self {
        SchemaError::Rejected(err)
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_codes() {
        assert_eq!(IssueCode::TypeMismatch.code(), "HIRE_TYPE_MISMATCH");
        assert_eq!(IssueCode::UniqueKeyMissing.code(), "HIRE_UNIQUE_KEY_MISSING");
        assert_eq!(IssueCode::MissingField.category(), IssueCategory::Shape);
        assert_eq!(
            IssueCode::ConstraintViolation.category(),
            IssueCategory::Constraint
        );
        assert_eq!(
            IssueCode::UniqueKeyMissing.category(),
            IssueCategory::UniqueShape
        );
    }

    #[test]
    fn test_path_display() {
        let path = FieldPath::root().key("jobs").index(0).key("department").key("title");
        assert_eq!(path.to_string(), "jobs[0].department.title");
        assert_eq!(FieldPath::root().to_string(), "$root");
        assert_eq!(FieldPath::root().index(2).to_string(), "[2]");
    }

    #[test]
    fn test_issue_serializes_flat() {
        let issue = ValidationIssue::constraint(FieldPath::root().key("phone"), "Invalid phone number");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"], "phone");
        assert_eq!(json["code"], "HIRE_CONSTRAINT_VIOLATION");
        assert_eq!(json["message"], "Invalid phone number");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new(
            "UserSchema",
            vec![ValidationIssue::missing_field(FieldPath::root().key("email"))],
        );
        let display = err.to_string();
        assert!(display.contains("1 validation issue"));
        assert!(display.contains("UserSchema"));
        assert!(display.contains("email"));
    }

    #[test]
    fn test_issues_at() {
        let err = ValidationError::new(
            "UserSchema",
            vec![
                ValidationIssue::missing_field(FieldPath::root().key("email")),
                ValidationIssue::constraint(FieldPath::root().key("phone"), "bad"),
            ],
        );
        assert_eq!(err.issues_at("phone").len(), 1);
        assert!(err.has_code(IssueCode::MissingField));
        assert!(!err.has_code(IssueCode::TypeMismatch));
    }

    #[test]
    fn test_rejection_exposes_issues() {
        let err: SchemaError = ValidationError::new(
            "X",
            vec![ValidationIssue::unrecognized_key(FieldPath::root().key("extra"))],
        )
        .into();
        assert!(err.is_rejection());
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.code(), "HIRE_VALIDATION_FAILED");
        assert!(SchemaError::UnknownSchema("Nope".into()).issues().is_empty());
    }
}
