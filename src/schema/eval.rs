//! In-memory where-input evaluation
//!
//! Evaluates a validated `{M}WhereInput` against a record held as a JSON
//! object. Relations are embedded in the record: a to-one relation as a
//! nested object (or `null`), a to-many relation as an array.
//!
//! Semantics:
//! - Keys of one filter object are conjunctive
//! - `AND: []` matches everything, `OR: []` matches nothing, `NOT: []`
//!   matches everything
//! - Comparisons against a null column never match
//! - A stored JSON column is DB-null when absent, `null` or the DbNull marker

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::model::{Catalog, ModelDef, RelationField, ScalarKind};

use super::json::NullMarker;
use super::primitive::coerce_datetime;

static NULL: Value = Value::Null;

/// True if `record` satisfies `filter`; unknown models never match.
pub fn matches(catalog: &Catalog, model: &str, filter: &Value, record: &Value) -> bool {
    match catalog.model(model) {
        Some(def) => matches_model(catalog, def, filter, record),
        None => false,
    }
}

fn list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn matches_model(catalog: &Catalog, model: &ModelDef, filter: &Value, record: &Value) -> bool {
    let Some(filter) = filter.as_object() else {
        return false;
    };
    filter.iter().all(|(key, cond)| match key.as_str() {
        "AND" => list(cond)
            .into_iter()
            .all(|f| matches_model(catalog, model, f, record)),
        "OR" => list(cond)
            .into_iter()
            .any(|f| matches_model(catalog, model, f, record)),
        "NOT" => list(cond)
            .into_iter()
            .all(|f| !matches_model(catalog, model, f, record)),
        name => {
            let stored = record.get(name);
            if let Some(field) = model.scalar(name) {
                if field.kind == ScalarKind::Json {
                    matches_json(cond, stored)
                } else {
                    matches_scalar(&field.kind, cond, stored.unwrap_or(&NULL))
                }
            } else if let Some(relation) = model.relation_named(name) {
                matches_relation(catalog, relation, cond, stored)
            } else {
                false
            }
        }
    })
}

fn matches_scalar(kind: &ScalarKind, cond: &Value, value: &Value) -> bool {
    match cond {
        Value::Object(ops) => matches_ops(kind, ops, value, false),
        shorthand => equals(kind, value, shorthand, false),
    }
}

/// `inherited` carries the enclosing filter's `mode` into nested `not` filters.
fn matches_ops(kind: &ScalarKind, ops: &Map<String, Value>, value: &Value, inherited: bool) -> bool {
    let insensitive =
        inherited || ops.get("mode").and_then(Value::as_str) == Some("insensitive");
    let ordered = |operand: &Value, accept: fn(Ordering) -> bool| {
        compare(kind, value, operand, insensitive).map_or(false, accept)
    };

    ops.iter().all(|(op, operand)| match op.as_str() {
        "equals" => equals(kind, value, operand, insensitive),
        "in" => {
            !value.is_null()
                && operand.as_array().map_or(false, |items| {
                    items.iter().any(|item| equals(kind, value, item, insensitive))
                })
        }
        "notIn" => {
            !value.is_null()
                && operand.as_array().map_or(false, |items| {
                    !items.iter().any(|item| equals(kind, value, item, insensitive))
                })
        }
        "lt" => ordered(operand, Ordering::is_lt),
        "lte" => ordered(operand, Ordering::is_le),
        "gt" => ordered(operand, Ordering::is_gt),
        "gte" => ordered(operand, Ordering::is_ge),
        "contains" => text_op(value, operand, insensitive, |s, p| s.contains(p)),
        "startsWith" => text_op(value, operand, insensitive, |s, p| s.starts_with(p)),
        "endsWith" => text_op(value, operand, insensitive, |s, p| s.ends_with(p)),
        "mode" => true,
        "not" => match operand {
            Value::Null => !value.is_null(),
            Value::Object(nested) => {
                !value.is_null() && !matches_ops(kind, nested, value, insensitive)
            }
            other => !value.is_null() && !equals(kind, value, other, insensitive),
        },
        // Aggregate conditions only apply to grouped rows
        "_count" | "_min" | "_max" | "_avg" | "_sum" => true,
        _ => false,
    })
}

fn equals(kind: &ScalarKind, value: &Value, operand: &Value, insensitive: bool) -> bool {
    if operand.is_null() || value.is_null() {
        return operand.is_null() && value.is_null();
    }
    match compare(kind, value, operand, insensitive) {
        Some(ordering) => ordering == Ordering::Equal,
        None => value == operand,
    }
}

fn compare(kind: &ScalarKind, a: &Value, b: &Value, insensitive: bool) -> Option<Ordering> {
    match kind {
        ScalarKind::DateTime => Some(coerce_datetime(a)?.cmp(&coerce_datetime(b)?)),
        ScalarKind::Int | ScalarKind::Float => a.as_f64()?.partial_cmp(&b.as_f64()?),
        ScalarKind::String | ScalarKind::Enum { .. } => {
            let (a, b) = (a.as_str()?, b.as_str()?);
            if insensitive {
                Some(a.to_lowercase().cmp(&b.to_lowercase()))
            } else {
                Some(a.cmp(b))
            }
        }
        ScalarKind::Boolean => Some(a.as_bool()?.cmp(&b.as_bool()?)),
        ScalarKind::Json => compare_json(a, b),
    }
}

fn text_op(value: &Value, operand: &Value, insensitive: bool, op: fn(&str, &str) -> bool) -> bool {
    let (Some(s), Some(p)) = (value.as_str(), operand.as_str()) else {
        return false;
    };
    if insensitive {
        op(&s.to_lowercase(), &p.to_lowercase())
    } else {
        op(s, p)
    }
}

fn matches_relation(
    catalog: &Catalog,
    relation: &RelationField,
    cond: &Value,
    stored: Option<&Value>,
) -> bool {
    let Some(target) = catalog.model(&relation.target) else {
        return false;
    };
    let test = |filter: &Value, row: &Value| matches_model(catalog, target, filter, row);

    if relation.is_many() {
        let rows: Vec<&Value> = stored
            .and_then(Value::as_array)
            .map(|items| items.iter().collect())
            .unwrap_or_default();
        let Some(ops) = cond.as_object() else {
            return false;
        };
        return ops.iter().all(|(op, filter)| match op.as_str() {
            "some" => rows.iter().any(|row| test(filter, *row)),
            "every" => rows.iter().all(|row| test(filter, *row)),
            "none" => !rows.iter().any(|row| test(filter, *row)),
            _ => false,
        });
    }

    let related = stored.filter(|v| !v.is_null());
    match cond {
        Value::Null => related.is_none(),
        Value::Object(ops)
            if !ops.is_empty() && ops.keys().all(|k| k == "is" || k == "isNot") =>
        {
            ops.iter().all(|(op, filter)| match (op.as_str(), filter) {
                ("is", Value::Null) => related.is_none(),
                ("is", filter) => related.map_or(false, |row| test(filter, row)),
                ("isNot", Value::Null) => related.is_some(),
                ("isNot", filter) => related.map_or(true, |row| !test(filter, row)),
                _ => false,
            })
        }
        direct => related.map_or(false, |row| test(direct, row)),
    }
}

fn is_db_null(stored: Option<&Value>) -> bool {
    match stored {
        None | Some(Value::Null) => true,
        Some(v) => NullMarker::from_value(v) == Some(NullMarker::DbNull),
    }
}

fn is_json_null(value: &Value) -> bool {
    value.is_null() || NullMarker::from_value(value) == Some(NullMarker::JsonNull)
}

fn follow<'a>(value: &'a Value, path: &[Value]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| {
        let segment = segment.as_str()?;
        match current {
            Value::Object(obj) => obj.get(segment),
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        }
    })
}

fn matches_json(cond: &Value, stored: Option<&Value>) -> bool {
    let Some(ops) = cond.as_object() else {
        return false;
    };
    let db_null = is_db_null(stored);
    let document = if db_null { None } else { stored };
    let target = match ops.get("path").and_then(Value::as_array) {
        Some(path) => document.and_then(|doc| follow(doc, path)),
        None => document,
    };

    ops.iter().all(|(op, operand)| match op.as_str() {
        "path" => true,
        "equals" => json_equals(operand, db_null, target),
        "not" => !json_equals(operand, db_null, target),
        "string_contains" => json_text(target, operand, |s, p| s.contains(p)),
        "string_starts_with" => json_text(target, operand, |s, p| s.starts_with(p)),
        "string_ends_with" => json_text(target, operand, |s, p| s.ends_with(p)),
        "array_contains" => json_array(target, operand, |items, wanted| {
            wanted.iter().all(|w| items.contains(w))
        }),
        "array_starts_with" => json_array(target, operand, |items, wanted| {
            items.starts_with(wanted)
        }),
        "array_ends_with" => json_array(target, operand, |items, wanted| {
            items.ends_with(wanted)
        }),
        "lt" => json_ordered(target, operand, Ordering::is_lt),
        "lte" => json_ordered(target, operand, Ordering::is_le),
        "gt" => json_ordered(target, operand, Ordering::is_gt),
        "gte" => json_ordered(target, operand, Ordering::is_ge),
        "_count" | "_min" | "_max" => true,
        _ => false,
    })
}

fn json_equals(operand: &Value, db_null: bool, target: Option<&Value>) -> bool {
    match NullMarker::from_value(operand) {
        Some(NullMarker::DbNull) => db_null,
        Some(NullMarker::JsonNull) => target.map_or(false, is_json_null),
        Some(NullMarker::AnyNull) => db_null || target.map_or(false, is_json_null),
        None => target == Some(operand),
    }
}

fn json_text(target: Option<&Value>, operand: &Value, op: fn(&str, &str) -> bool) -> bool {
    match (target.and_then(Value::as_str), operand.as_str()) {
        (Some(s), Some(p)) => op(s, p),
        _ => false,
    }
}

fn json_array(target: Option<&Value>, operand: &Value, op: fn(&[Value], &[Value]) -> bool) -> bool {
    let Some(items) = target.and_then(Value::as_array) else {
        return false;
    };
    match operand {
        Value::Array(wanted) => op(items, wanted),
        single => op(items, std::slice::from_ref(single)),
    }
}

fn json_ordered(target: Option<&Value>, operand: &Value, accept: fn(Ordering) -> bool) -> bool {
    target
        .and_then(|t| compare_json(t, operand))
        .map_or(false, accept)
}

fn compare_json(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
