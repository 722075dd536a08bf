//! Primitive validators
//!
//! Leaf rules for scalars: string length/format/pattern checks, number sign
//! checks, date coercion, and the node a catalog field compiles to.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::model::{Constraint, ConstraintKind, ScalarField, ScalarKind};

use super::errors::{SchemaError, SchemaResult};
use super::json;
use super::node::Node;

static EMAIL: OnceLock<Regex> = OnceLock::new();
static URL: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-']+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
            .expect("static email pattern compiles")
    })
}

fn url_regex() -> &'static Regex {
    URL.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$").expect("static url pattern compiles")
    })
}

/// Compiled constraint
#[derive(Debug, Clone)]
pub enum CheckKind {
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Email,
    Url,
    Uuid,
    Positive,
    NonNegative,
    Min(f64),
    Max(f64),
}

/// A compiled constraint plus the message reported when it fails.
#[derive(Debug, Clone)]
pub struct Check {
    kind: CheckKind,
    message: Option<String>,
}

impl Check {
    pub fn new(kind: CheckKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Compiles a catalog constraint.
    pub fn compile(model: &str, field: &str, constraint: &Constraint) -> SchemaResult<Self> {
        let kind = match &constraint.kind {
            ConstraintKind::MinLength { value } => CheckKind::MinLength(*value),
            ConstraintKind::MaxLength { value } => CheckKind::MaxLength(*value),
            ConstraintKind::Pattern { value } => CheckKind::Pattern(
                Regex::new(value)
                    .map_err(|e| SchemaError::invalid_pattern(model, field, e.to_string()))?,
            ),
            ConstraintKind::Email => CheckKind::Email,
            ConstraintKind::Url => CheckKind::Url,
            ConstraintKind::Uuid => CheckKind::Uuid,
            ConstraintKind::Positive => CheckKind::Positive,
            ConstraintKind::NonNegative => CheckKind::NonNegative,
            ConstraintKind::Min { value } => CheckKind::Min(*value),
            ConstraintKind::Max { value } => CheckKind::Max(*value),
        };
        Ok(Self {
            kind,
            message: constraint.message.clone(),
        })
    }

    pub fn kind(&self) -> &CheckKind {
        &self.kind
    }

    /// True for checks that apply to strings
    pub fn is_string_check(&self) -> bool {
        matches!(
            self.kind,
            CheckKind::MinLength(_)
                | CheckKind::MaxLength(_)
                | CheckKind::Pattern(_)
                | CheckKind::Email
                | CheckKind::Url
                | CheckKind::Uuid
        )
    }

    fn fail(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.kind {
            CheckKind::MinLength(n) => format!("must contain at least {} character(s)", n),
            CheckKind::MaxLength(n) => format!("must contain at most {} character(s)", n),
            CheckKind::Pattern(re) => format!("must match pattern {}", re.as_str()),
            CheckKind::Email => "invalid email".into(),
            CheckKind::Url => "invalid url".into(),
            CheckKind::Uuid => "invalid uuid".into(),
            CheckKind::Positive => "must be greater than 0".into(),
            CheckKind::NonNegative => "must be greater than or equal to 0".into(),
            CheckKind::Min(n) => format!("must be greater than or equal to {}", n),
            CheckKind::Max(n) => format!("must be less than or equal to {}", n),
        }
    }

    /// Runs the check against a string; number checks always pass.
    pub fn check_str(&self, s: &str) -> Result<(), String> {
        let ok = match &self.kind {
            CheckKind::MinLength(n) => s.chars().count() >= *n,
            CheckKind::MaxLength(n) => s.chars().count() <= *n,
            CheckKind::Pattern(re) => re.is_match(s),
            CheckKind::Email => email_regex().is_match(s),
            CheckKind::Url => url_regex().is_match(s),
            CheckKind::Uuid => Uuid::parse_str(s).is_ok(),
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(self.fail())
        }
    }

    /// Runs the check against a number; string checks always pass.
    pub fn check_number(&self, n: f64) -> Result<(), String> {
        let ok = match &self.kind {
            CheckKind::Positive => n > 0.0,
            CheckKind::NonNegative => n >= 0.0,
            CheckKind::Min(min) => n >= *min,
            CheckKind::Max(max) => n <= *max,
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(self.fail())
        }
    }
}

/// Coerces a date input: RFC 3339 timestamp, `YYYY-MM-DD`, or epoch millis.
pub fn coerce_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
        }
        Value::Number(n) => {
            let millis = n.as_i64()?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

/// Canonical timestamp text; stable under re-coercion.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Name of the registered schema for a catalog enum
pub fn enum_schema_name(name: &str) -> String {
    format!("{}Schema", name)
}

/// Uppercases the first character (`createdBy` -> `CreatedBy`).
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pascal-cases an underscore-joined key (`candidateId_jobId` -> `CandidateIdJobId`).
pub fn pascal_case(s: &str) -> String {
    s.split('_').map(capitalize).collect()
}

/// Bare node for a scalar kind, without field constraints.
pub fn kind_node(kind: &ScalarKind) -> Node {
    match kind {
        ScalarKind::String => Node::string(),
        ScalarKind::Int => Node::int(),
        ScalarKind::Float => Node::float(),
        ScalarKind::Boolean => Node::Boolean,
        ScalarKind::DateTime => Node::DateTime,
        ScalarKind::Json => Node::reference(json::JSON_VALUE),
        ScalarKind::Enum { name } => Node::reference(enum_schema_name(name)),
    }
}

/// Node for a catalog field with its constraints compiled in.
///
/// Nullability is left to the caller.
pub fn field_node(model: &str, field: &ScalarField) -> SchemaResult<Node> {
    let checks = field
        .constraints
        .iter()
        .map(|c| Check::compile(model, &field.name, c))
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(match &field.kind {
        ScalarKind::String => Node::String(checks),
        ScalarKind::Int => Node::Number {
            integer: true,
            checks,
        },
        ScalarKind::Float => Node::Number {
            integer: false,
            checks,
        },
        other => kind_node(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PHONE_PATTERN;
    use serde_json::json;

    fn pattern(p: &str) -> Check {
        Check::new(CheckKind::Pattern(Regex::new(p).unwrap()))
    }

    #[test]
    fn test_phone_pattern() {
        let check = pattern(PHONE_PATTERN).with_message("Invalid phone number");
        assert!(check.check_str("+14155550123").is_ok());
        assert!(check.check_str("4155550123").is_ok());
        assert_eq!(check.check_str("12345").unwrap_err(), "Invalid phone number");
        assert!(check.check_str("+04155550123").is_err());
    }

    #[test]
    fn test_email_format() {
        let check = Check::new(CheckKind::Email);
        assert!(check.check_str("jane.doe@example.com").is_ok());
        assert!(check.check_str("jane@mail.example.co").is_ok());
        assert!(check.check_str("jane@").is_err());
        assert!(check.check_str("not an email").is_err());
    }

    #[test]
    fn test_url_and_uuid() {
        assert!(Check::new(CheckKind::Url).check_str("https://cdn.example.com/r/1.pdf").is_ok());
        assert!(Check::new(CheckKind::Url).check_str("example.com").is_err());
        assert!(Check::new(CheckKind::Uuid)
            .check_str("6f1c2a8e-3b1d-4c5e-9f7a-2d3b4c5d6e7f")
            .is_ok());
        assert!(Check::new(CheckKind::Uuid).check_str("r1").is_err());
    }

    #[test]
    fn test_length_counts_chars() {
        let check = Check::new(CheckKind::MinLength(2));
        assert!(check.check_str("éé").is_ok());
        assert!(check.check_str("é").is_err());
        assert!(Check::new(CheckKind::MaxLength(1)).check_str("ab").is_err());
    }

    #[test]
    fn test_number_checks() {
        assert!(Check::new(CheckKind::Positive).check_number(1.0).is_ok());
        assert!(Check::new(CheckKind::Positive).check_number(0.0).is_err());
        assert!(Check::new(CheckKind::NonNegative).check_number(0.0).is_ok());
        assert!(Check::new(CheckKind::Min(3.0)).check_number(2.5).is_err());
        assert!(Check::new(CheckKind::Max(3.0)).check_number(2.5).is_ok());
        // String rules ignore numbers
        assert!(Check::new(CheckKind::Email).check_number(1.0).is_ok());
    }

    #[test]
    fn test_default_messages() {
        let err = Check::new(CheckKind::MinLength(8)).check_str("short").unwrap_err();
        assert!(err.contains("at least 8"));
    }

    #[test]
    fn test_coerce_datetime() {
        let dt = coerce_datetime(&json!("2026-03-01T10:30:00+02:00")).unwrap();
        assert_eq!(format_datetime(&dt), "2026-03-01T08:30:00.000Z");

        let day = coerce_datetime(&json!("2026-03-01")).unwrap();
        assert_eq!(format_datetime(&day), "2026-03-01T00:00:00.000Z");

        let millis = coerce_datetime(&json!(0)).unwrap();
        assert_eq!(format_datetime(&millis), "1970-01-01T00:00:00.000Z");

        assert!(coerce_datetime(&json!("yesterday")).is_none());
        assert!(coerce_datetime(&json!(true)).is_none());
    }

    #[test]
    fn test_format_is_stable() {
        let once = format_datetime(&coerce_datetime(&json!("2026-01-02T03:04:05.678Z")).unwrap());
        let twice = format_datetime(&coerce_datetime(&json!(once.clone())).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!({})), "object");
    }

    #[test]
    fn test_naming_helpers() {
        assert_eq!(capitalize("createdBy"), "CreatedBy");
        assert_eq!(capitalize(""), "");
        assert_eq!(pascal_case("userId_jobId_candidateId"), "UserIdJobIdCandidateId");
    }

    #[test]
    fn test_field_node_compiles_constraints() {
        let field = ScalarField::string("phone").check(
            ConstraintKind::Pattern {
                value: PHONE_PATTERN.into(),
            },
            "Invalid phone number",
        );
        match field_node("User", &field).unwrap() {
            Node::String(checks) => assert_eq!(checks.len(), 1),
            other => panic!("unexpected node {:?}", other),
        }
    }
}
