//! Validator for registry schemas
//!
//! Validation semantics:
//! - Every issue is collected, each tagged with the path it occurred at
//! - Strict objects report undeclared keys; strip objects drop them
//! - Omitted fields are synthesized (defaults), skipped (optional) or
//!   reported as missing
//! - Dates are coerced and normalized, everything else is never coerced
//! - A union takes the first variant that accepts the value
//! - Container nesting beyond `max_depth` is a shape issue
//!
//! Validation never mutates its input; the normalized value is returned.

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::model::DefaultRule;

use super::config::ValidationConfig;
use super::errors::{
    FieldPath, IssueCode, SchemaError, SchemaResult, ValidationError, ValidationIssue,
};
use super::node::{Node, ObjectNode, UniqueNode, UnknownKeys};
use super::primitive::{coerce_datetime, format_datetime, json_type_name};
use super::registry::Registry;

/// Name reported for nodes that are not registered
const INLINE_SCHEMA: &str = "<inline>";

/// Validates values against the schemas of one registry.
pub struct Validator<'a> {
    registry: &'a Registry,
    config: ValidationConfig,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self::with_config(registry, ValidationConfig::default())
    }

    pub fn with_config(registry: &'a Registry, config: ValidationConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates `input` against the named schema.
    ///
    /// # Errors
    ///
    /// - `UnknownSchema` if the name is not registered
    /// - `Rejected` carrying every issue found
    pub fn validate(&self, schema: &str, input: &Value) -> SchemaResult<Value> {
        let node = self
            .registry
            .get(schema)
            .ok_or_else(|| SchemaError::UnknownSchema(schema.to_string()))?;
        self.run(schema, node, input)
    }

    /// Validates against an ad-hoc node whose references point into the registry.
    pub fn validate_node(&self, node: &Node, input: &Value) -> SchemaResult<Value> {
        let mut refs = Vec::new();
        node.collect_refs(&mut refs);
        if let Some(target) = refs.into_iter().find(|r| !self.registry.contains(r)) {
            return Err(SchemaError::UnresolvedReference {
                from: INLINE_SCHEMA.to_string(),
                target: target.to_string(),
            });
        }
        self.run(INLINE_SCHEMA, node, input)
    }

    pub fn accepts(&self, schema: &str, input: &Value) -> bool {
        self.validate(schema, input).is_ok()
    }

    fn run(&self, schema: &str, node: &Node, input: &Value) -> SchemaResult<Value> {
        let mut issues = Vec::new();
        let output = self.check(node, input, &FieldPath::root(), 0, &mut issues);
        if issues.is_empty() {
            Ok(output)
        } else {
            Err(ValidationError::new(schema, issues).into())
        }
    }

    /// Checks a present value; returns its normalized form.
    fn check(
        &self,
        node: &Node,
        value: &Value,
        path: &FieldPath,
        depth: usize,
        issues: &mut Vec<ValidationIssue>,
    ) -> Value {
        match node {
            Node::String(checks) => {
                let Some(s) = value.as_str() else {
                    issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        "string",
                        json_type_name(value),
                    ));
                    return value.clone();
                };
                for check in checks {
                    if let Err(message) = check.check_str(s) {
                        issues.push(ValidationIssue::constraint(path.clone(), message));
                    }
                }
                value.clone()
            }

            Node::Number { integer, checks } => {
                let accepted = match value {
                    Value::Number(n) if *integer => n.is_i64() || n.is_u64(),
                    Value::Number(_) => true,
                    _ => false,
                };
                if !accepted {
                    issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        node.describe().as_str(),
                        json_type_name(value),
                    ));
                    return value.clone();
                }
                if let Some(n) = value.as_f64() {
                    for check in checks {
                        if let Err(message) = check.check_number(n) {
                            issues.push(ValidationIssue::constraint(path.clone(), message));
                        }
                    }
                }
                value.clone()
            }

            Node::Boolean => {
                if !value.is_boolean() {
                    issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        "bool",
                        json_type_name(value),
                    ));
                }
                value.clone()
            }

            Node::DateTime => match coerce_datetime(value) {
                Some(dt) => Value::String(format_datetime(&dt)),
                None => {
                    issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        "date",
                        json_type_name(value),
                    ));
                    value.clone()
                }
            },

            Node::Enum { name, values } => {
                match value.as_str() {
                    Some(s) if values.iter().any(|v| v == s) => {}
                    Some(s) => issues.push(ValidationIssue::constraint(
                        path.clone(),
                        format!("expected one of {} ({}), got '{}'", values.join(", "), name, s),
                    )),
                    None => issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        name,
                        json_type_name(value),
                    )),
                }
                value.clone()
            }

            Node::Literal(expected) => {
                if value != expected {
                    issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        &expected.to_string(),
                        &value.to_string(),
                    ));
                }
                value.clone()
            }

            Node::Array(inner) => {
                let Some(items) = value.as_array() else {
                    issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        "array",
                        json_type_name(value),
                    ));
                    return value.clone();
                };
                let Some(depth) = self.descend(depth, path, issues) else {
                    return value.clone();
                };
                Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| self.check(inner, item, &path.index(i), depth, issues))
                        .collect(),
                )
            }

            Node::Record(inner) => {
                let Some(obj) = value.as_object() else {
                    issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        "object",
                        json_type_name(value),
                    ));
                    return value.clone();
                };
                let Some(depth) = self.descend(depth, path, issues) else {
                    return value.clone();
                };
                Value::Object(
                    obj.iter()
                        .map(|(k, v)| (k.clone(), self.check(inner, v, &path.key(k), depth, issues)))
                        .collect(),
                )
            }

            Node::Object(shape) => self.check_object(shape, value, path, depth, issues),

            Node::Unique(unique) => self.check_unique(unique, value, path, depth, issues),

            Node::Union(variants) => self.check_union(variants, value, path, depth, issues),

            Node::Optional(inner) | Node::Default(inner, _) => {
                self.check(inner, value, path, depth, issues)
            }

            Node::Nullable(inner) => {
                if value.is_null() {
                    Value::Null
                } else {
                    self.check(inner, value, path, depth, issues)
                }
            }

            Node::Transform(inner, transform) => {
                let before = issues.len();
                let output = self.check(inner, value, path, depth, issues);
                if issues.len() == before {
                    transform.apply(output)
                } else {
                    output
                }
            }

            Node::Except(inner, reserved) => {
                if reserved.contains(value) {
                    issues.push(ValidationIssue::constraint(
                        path.clone(),
                        format!("{} is reserved and cannot be stored as a value", value),
                    ));
                    return value.clone();
                }
                self.check(inner, value, path, depth, issues)
            }

            Node::Ref(name) => match self.registry.get(name) {
                Some(target) => self.check(target, value, path, depth, issues),
                None => {
                    issues.push(ValidationIssue::type_mismatch(
                        path.clone(),
                        name,
                        json_type_name(value),
                    ));
                    value.clone()
                }
            },
        }
    }

    /// Enters one container level, or reports the overflow.
    fn descend(
        &self,
        depth: usize,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<usize> {
        let next = depth + 1;
        if next > self.config.max_depth {
            issues.push(ValidationIssue::depth_exceeded(path.clone(), self.config.max_depth));
            None
        } else {
            Some(next)
        }
    }

    fn check_object(
        &self,
        shape: &ObjectNode,
        value: &Value,
        path: &FieldPath,
        depth: usize,
        issues: &mut Vec<ValidationIssue>,
    ) -> Value {
        let Some(obj) = value.as_object() else {
            issues.push(ValidationIssue::type_mismatch(
                path.clone(),
                "object",
                json_type_name(value),
            ));
            return value.clone();
        };
        let Some(depth) = self.descend(depth, path, issues) else {
            return value.clone();
        };

        if shape.unknown_keys() == UnknownKeys::Strict {
            for key in obj.keys() {
                if !shape.declares(key) {
                    issues.push(ValidationIssue::unrecognized_key(path.key(key)));
                }
            }
        }

        let mut output = Map::new();
        for (name, field) in shape.fields() {
            let field_path = path.key(name);
            match obj.get(name) {
                Some(v) => {
                    let normalized = self.check(field, v, &field_path, depth, issues);
                    output.insert(name.clone(), normalized);
                }
                None => match field {
                    Node::Default(_, rule) => {
                        output.insert(name.clone(), synthesize(rule));
                    }
                    Node::Optional(_) => {}
                    _ => issues.push(ValidationIssue::missing_field(field_path)),
                },
            }
        }
        Value::Object(output)
    }

    fn check_unique(
        &self,
        unique: &UniqueNode,
        value: &Value,
        path: &FieldPath,
        depth: usize,
        issues: &mut Vec<ValidationIssue>,
    ) -> Value {
        let output = self.check_object(&unique.body, value, path, depth, issues);
        if let Some(obj) = value.as_object() {
            let present = unique
                .keys
                .iter()
                .any(|key| obj.get(key).map_or(false, |v| !v.is_null()));
            if !present {
                issues.push(ValidationIssue::unique_key_missing(path.clone(), &unique.keys));
            }
        }
        output
    }

    /// First accepting variant wins. Otherwise the closest failing variant
    /// is reported; variants rejected on type alone do not count.
    fn check_union(
        &self,
        variants: &[Node],
        value: &Value,
        path: &FieldPath,
        depth: usize,
        issues: &mut Vec<ValidationIssue>,
    ) -> Value {
        let mut closest: Option<Vec<ValidationIssue>> = None;
        for variant in variants {
            let mut trial = Vec::new();
            let output = self.check(variant, value, path, depth, &mut trial);
            if trial.is_empty() {
                return output;
            }
            if rejected_on_type(&trial, path) {
                continue;
            }
            if closest.as_ref().map_or(true, |best| trial.len() < best.len()) {
                closest = Some(trial);
            }
        }
        match closest {
            Some(best) => issues.extend(best),
            None => issues.push(ValidationIssue::no_matching_variant(
                path.clone(),
                json_type_name(value),
            )),
        }
        value.clone()
    }
}

fn rejected_on_type(trial: &[ValidationIssue], path: &FieldPath) -> bool {
    match trial {
        [only] => {
            only.path == *path
                && matches!(
                    only.code,
                    IssueCode::TypeMismatch | IssueCode::NoMatchingVariant
                )
        }
        _ => false,
    }
}

fn synthesize(rule: &DefaultRule) -> Value {
    match rule {
        DefaultRule::Uuid => Value::String(Uuid::new_v4().to_string()),
        DefaultRule::Now => Value::String(format_datetime(&Utc::now())),
        DefaultRule::Literal(value) => value.clone(),
    }
}
