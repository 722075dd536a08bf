//! Typed view of where-unique inputs

use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::ModelDef;

/// One way a where-unique input identifies a row.
#[derive(Debug, Clone, PartialEq)]
pub enum UniqueMatch {
    /// Single unique column, e.g. `email`
    Single { field: String, value: Value },
    /// Compound key, e.g. `candidateId_jobId`
    Compound {
        key: String,
        values: BTreeMap<String, Value>,
    },
}

impl UniqueMatch {
    /// Input key this match was read from
    pub fn key(&self) -> &str {
        match self {
            UniqueMatch::Single { field, .. } => field,
            UniqueMatch::Compound { key, .. } => key,
        }
    }
}

/// Top-level keys of `{M}WhereUniqueInput`: unique columns (ids first),
/// then compound key names.
pub fn unique_key_names(model: &ModelDef) -> Vec<String> {
    model
        .unique_fields()
        .into_iter()
        .map(|f| f.name.clone())
        .chain(model.unique_keys.iter().map(|k| k.name.clone()))
        .collect()
}

/// Every unique key present (and non-null) in a validated where-unique input.
pub fn unique_matches(model: &ModelDef, input: &Value) -> Vec<UniqueMatch> {
    let Some(obj) = input.as_object() else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    for field in model.unique_fields() {
        if let Some(value) = obj.get(&field.name).filter(|v| !v.is_null()) {
            matches.push(UniqueMatch::Single {
                field: field.name.clone(),
                value: value.clone(),
            });
        }
    }
    for key in &model.unique_keys {
        let Some(parts) = obj.get(&key.name).and_then(Value::as_object) else {
            continue;
        };
        let values = key
            .fields
            .iter()
            .filter_map(|f| parts.get(f).map(|v| (f.clone(), v.clone())))
            .collect::<BTreeMap<_, _>>();
        if values.len() == key.fields.len() {
            matches.push(UniqueMatch::Compound {
                key: key.name.clone(),
                values,
            });
        }
    }
    matches
}
