//! JSON column schemas and null sentinels
//!
//! A JSON column distinguishes two kinds of "nothing": the column itself is
//! NULL in the database (`DbNull`) or the column holds the JSON literal `null`
//! (`JsonNull`). Filters add `AnyNull` to match either. Normalized output
//! encodes a sentinel as the marker object `{"$null": "<Marker>"}`. That
//! shape is reserved: the document schemas reject it at every depth, and
//! only column and sentinel positions accept it back as a marker.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::errors::SchemaResult;
use super::node::Node;
use super::registry::RegistryBuilder;
use super::validator::Validator;

pub const JSON_VALUE: &str = "JsonValueSchema";
pub const NULLABLE_JSON_VALUE: &str = "NullableJsonValue";
pub const INPUT_JSON_VALUE: &str = "InputJsonValueSchema";
pub const JSON_NULL_VALUE_INPUT: &str = "JsonNullValueInputSchema";
pub const NULLABLE_JSON_NULL_VALUE_INPUT: &str = "NullableJsonNullValueInputSchema";
pub const JSON_NULL_VALUE_FILTER: &str = "JsonNullValueFilterSchema";

/// Key of the marker object
pub const MARKER_KEY: &str = "$null";

/// Null sentinel carried through normalized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullMarker {
    DbNull,
    JsonNull,
    AnyNull,
}

impl NullMarker {
    pub fn name(&self) -> &'static str {
        match self {
            NullMarker::DbNull => "DbNull",
            NullMarker::JsonNull => "JsonNull",
            NullMarker::AnyNull => "AnyNull",
        }
    }

    pub fn to_value(self) -> Value {
        json!({ MARKER_KEY: self.name() })
    }

    /// Recognizes a marker object; anything else is `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.len() != 1 {
            return None;
        }
        match obj.get(MARKER_KEY)?.as_str()? {
            "DbNull" => Some(NullMarker::DbNull),
            "JsonNull" => Some(NullMarker::JsonNull),
            "AnyNull" => Some(NullMarker::AnyNull),
            _ => None,
        }
    }
}

impl fmt::Display for NullMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Output rewrite applied after the inner node accepted a value.
#[derive(Debug, Clone)]
pub enum Transform {
    /// `null` and `"DbNull"` become DbNull, `"JsonNull"` becomes JsonNull
    NullableJson,
    /// Enum member name to marker
    Markers(&'static [(&'static str, NullMarker)]),
}

const NULLABLE_INPUT_MARKERS: &[(&str, NullMarker)] = &[
    ("DbNull", NullMarker::DbNull),
    ("JsonNull", NullMarker::JsonNull),
];

const INPUT_MARKERS: &[(&str, NullMarker)] = &[("JsonNull", NullMarker::JsonNull)];

// DbNull deliberately collapses to JsonNull on the filter side.
const FILTER_MARKERS: &[(&str, NullMarker)] = &[
    ("DbNull", NullMarker::JsonNull),
    ("JsonNull", NullMarker::JsonNull),
    ("AnyNull", NullMarker::AnyNull),
];

impl Transform {
    pub fn apply(&self, value: Value) -> Value {
        match self {
            Transform::NullableJson => match &value {
                Value::Null => NullMarker::DbNull.to_value(),
                Value::String(s) if s == "DbNull" => NullMarker::DbNull.to_value(),
                Value::String(s) if s == "JsonNull" => NullMarker::JsonNull.to_value(),
                _ => value,
            },
            Transform::Markers(table) => match &value {
                Value::String(s) => table
                    .iter()
                    .find(|(name, _)| name == s)
                    .map(|(_, marker)| marker.to_value())
                    .unwrap_or(value),
                _ => value,
            },
        }
    }
}

/// Every marker object, as rejected in document position.
fn reserved_markers() -> Vec<Value> {
    [NullMarker::DbNull, NullMarker::JsonNull, NullMarker::AnyNull]
        .into_iter()
        .map(NullMarker::to_value)
        .collect()
}

fn marker_literals(markers: &[NullMarker]) -> Vec<Node> {
    markers.iter().map(|m| Node::literal(m.to_value())).collect()
}

/// Member names map to markers; the markers themselves pass through unchanged.
fn sentinel_enum(name: &str, table: &'static [(&'static str, NullMarker)]) -> Node {
    let values: Vec<String> = table.iter().map(|(n, _)| n.to_string()).collect();
    let mut outputs: Vec<NullMarker> = Vec::new();
    for (_, marker) in table {
        if !outputs.contains(marker) {
            outputs.push(*marker);
        }
    }
    let mut variants = vec![Node::enumeration(name, &values).transform(Transform::Markers(table))];
    variants.extend(marker_literals(&outputs));
    Node::union(variants)
}

/// Declares the JSON value schemas and sentinel enums.
pub fn declare(builder: &mut RegistryBuilder) -> SchemaResult<()> {
    builder.declare(
        JSON_VALUE,
        Node::union(vec![
            Node::string(),
            Node::float(),
            Node::Boolean,
            Node::literal(Value::Null),
            Node::Record(Box::new(Node::reference(JSON_VALUE).optional())),
            Node::reference(JSON_VALUE).array(),
        ])
        .except(reserved_markers()),
    )?;

    let mut variants = marker_literals(&[NullMarker::DbNull, NullMarker::JsonNull]);
    variants.extend([
        Node::reference(JSON_VALUE),
        Node::literal(json!("DbNull")),
        Node::literal(json!("JsonNull")),
    ]);
    builder.declare(
        NULLABLE_JSON_VALUE,
        Node::union(variants)
            .nullable()
            .transform(Transform::NullableJson),
    )?;

    let member = Node::union(vec![Node::reference(INPUT_JSON_VALUE), Node::literal(Value::Null)]);
    builder.declare(
        INPUT_JSON_VALUE,
        Node::union(vec![
            Node::string(),
            Node::float(),
            Node::Boolean,
            Node::Record(Box::new(member.clone())),
            member.array(),
        ])
        .except(reserved_markers()),
    )?;

    builder.declare(
        JSON_NULL_VALUE_INPUT,
        sentinel_enum("JsonNullValueInput", INPUT_MARKERS),
    )?;
    builder.declare(
        NULLABLE_JSON_NULL_VALUE_INPUT,
        sentinel_enum("NullableJsonNullValueInput", NULLABLE_INPUT_MARKERS),
    )?;
    builder.declare(
        JSON_NULL_VALUE_FILTER,
        sentinel_enum("JsonNullValueFilter", FILTER_MARKERS),
    )?;
    Ok(())
}

/// Typed view of a normalized nullable JSON column.
#[derive(Debug, Clone, PartialEq)]
pub enum NullableJson {
    DbNull,
    JsonNull,
    Value(Value),
}

impl NullableJson {
    /// Reads a value produced by `NullableJsonValue`.
    pub fn from_normalized(value: &Value) -> Self {
        match NullMarker::from_value(value) {
            Some(NullMarker::JsonNull) => NullableJson::JsonNull,
            Some(_) => NullableJson::DbNull,
            None if value.is_null() => NullableJson::DbNull,
            None => NullableJson::Value(value.clone()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            NullableJson::DbNull => NullMarker::DbNull.to_value(),
            NullableJson::JsonNull => NullMarker::JsonNull.to_value(),
            NullableJson::Value(v) => v.clone(),
        }
    }
}

/// A value the store knows how to turn into JSON.
pub trait Serializable {
    fn to_json(&self) -> Value;
}

/// Stand-in for a `Serializable` leaf while the shape is validated
const OPAQUE_PROBE: &str = "<serializable>";

/// Writable JSON document; members may be `null`, the top level may not.
#[derive(Clone)]
pub enum InputJson {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Object(BTreeMap<String, Option<InputJson>>),
    Array(Vec<Option<InputJson>>),
    /// Opaque until `expand`
    Serializable(Arc<dyn Serializable + Send + Sync>),
}

impl fmt::Debug for InputJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputJson::String(s) => f.debug_tuple("String").field(s).finish(),
            InputJson::Number(n) => f.debug_tuple("Number").field(n).finish(),
            InputJson::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            InputJson::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
            InputJson::Array(items) => f.debug_tuple("Array").field(items).finish(),
            InputJson::Serializable(_) => f.write_str("Serializable(..)"),
        }
    }
}

impl InputJson {
    pub fn serializable(value: impl Serializable + Send + Sync + 'static) -> Self {
        InputJson::Serializable(Arc::new(value))
    }

    /// Converts plain JSON; `None` for a top-level `null`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let member = |v: &Value| InputJson::from_value(v);
        Some(match value {
            Value::Null => return None,
            Value::Bool(b) => InputJson::Bool(*b),
            Value::Number(n) => InputJson::Number(n.clone()),
            Value::String(s) => InputJson::String(s.clone()),
            Value::Array(items) => InputJson::Array(items.iter().map(member).collect()),
            Value::Object(obj) => {
                InputJson::Object(obj.iter().map(|(k, v)| (k.clone(), member(v))).collect())
            }
        })
    }

    /// The shape as seen by validation, serializable leaves left opaque.
    pub fn probe(&self) -> Value {
        self.render(&|_| Value::String(OPAQUE_PROBE.to_string()))
    }

    /// The document with every serializable leaf expanded.
    pub fn expand(&self) -> Value {
        self.render(&|leaf| leaf.to_json())
    }

    fn render(&self, leaf: &dyn Fn(&(dyn Serializable + Send + Sync)) -> Value) -> Value {
        let member = |m: &Option<InputJson>| match m {
            Some(inner) => inner.render(leaf),
            None => Value::Null,
        };
        match self {
            InputJson::String(s) => Value::String(s.clone()),
            InputJson::Number(n) => Value::Number(n.clone()),
            InputJson::Bool(b) => Value::Bool(*b),
            InputJson::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), member(v)))
                    .collect::<Map<_, _>>(),
            ),
            InputJson::Array(items) => Value::Array(items.iter().map(member).collect()),
            InputJson::Serializable(inner) => leaf(inner.as_ref()),
        }
    }

    /// Checks the shape against `InputJsonValueSchema`.
    pub fn validate(&self, validator: &Validator<'_>) -> SchemaResult<()> {
        validator.validate(INPUT_JSON_VALUE, &self.probe()).map(|_| ())
    }
}
