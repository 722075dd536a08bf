//! JSON Value Tests
//!
//! - Arbitrary documents round-trip unchanged through the recursive schema
//! - Nesting deeper than the configured limit is rejected, not overflowed
//! - Null sentinels normalize to explicit markers

use std::sync::Arc;

use hireguard::schema::{
    registry, InputJson, IssueCode, NullMarker, NullableJson, SchemaError, Serializable,
    ValidationConfig, Validator, INPUT_JSON_VALUE, JSON_NULL_VALUE_FILTER, JSON_NULL_VALUE_INPUT,
    JSON_VALUE, NULLABLE_JSON_NULL_VALUE_INPUT, NULLABLE_JSON_VALUE,
};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn validator() -> Validator<'static> {
    Validator::new(registry())
}

/// Alternating object/array nesting, `levels` containers deep.
fn nested(levels: usize) -> Value {
    (0..levels).fold(json!("leaf"), |inner, i| {
        if i % 2 == 0 {
            json!({ "level": i, "child": inner })
        } else {
            Value::Array(vec![json!(i), inner, Value::Null])
        }
    })
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

/// Documents within the limit are returned unchanged.
#[test]
fn test_deep_round_trip() {
    let doc = nested(50);
    assert_eq!(validator().validate(JSON_VALUE, &doc).unwrap(), doc);

    let mixed = json!({"a": [1, 2.5, true, null, {"b": "c"}], "d": {}});
    assert_eq!(validator().validate(JSON_VALUE, &mixed).unwrap(), mixed);
}

/// Exactly at the limit passes, one deeper fails.
#[test]
fn test_depth_boundary() {
    let limited = Validator::with_config(registry(), ValidationConfig::with_max_depth(10));
    assert!(limited.accepts(JSON_VALUE, &nested(10)));

    let err = limited.validate(JSON_VALUE, &nested(11)).unwrap_err();
    assert!(matches!(&err, SchemaError::Rejected(e) if e.has_code(IssueCode::DepthExceeded)));
}

/// The default limit rejects pathological nesting.
#[test]
fn test_default_depth_limit() {
    assert_eq!(validator().config().max_depth, 128);
    let err = validator().validate(JSON_VALUE, &nested(200)).unwrap_err();
    assert!(err.is_rejection());
    assert!(err.issues().iter().any(|i| i.code == IssueCode::DepthExceeded));
}

/// Input documents may hold null members but are never null themselves.
#[test]
fn test_input_json_rejects_top_level_null() {
    let v = validator();
    assert!(!v.accepts(INPUT_JSON_VALUE, &Value::Null));
    assert!(v.accepts(INPUT_JSON_VALUE, &json!({"a": null, "b": [null, 1]})));
    assert!(v.accepts(JSON_VALUE, &Value::Null));
}

// =============================================================================
// Null Sentinel Tests
// =============================================================================

/// Nullable JSON columns normalize null and sentinel names to markers.
#[test]
fn test_nullable_json_value_markers() {
    let v = validator();
    let db_null = v.validate(NULLABLE_JSON_VALUE, &Value::Null).unwrap();
    assert_eq!(db_null, NullMarker::DbNull.to_value());
    assert_eq!(NullableJson::from_normalized(&db_null), NullableJson::DbNull);

    let json_null = v.validate(NULLABLE_JSON_VALUE, &json!("JsonNull")).unwrap();
    assert_eq!(NullableJson::from_normalized(&json_null), NullableJson::JsonNull);

    let doc = v.validate(NULLABLE_JSON_VALUE, &json!({"k": 1})).unwrap();
    assert_eq!(NullableJson::from_normalized(&doc), NullableJson::Value(json!({"k": 1})));
}

/// Sentinel enums accept only their own members.
#[test]
fn test_sentinel_enums() {
    let v = validator();
    assert_eq!(
        v.validate(JSON_NULL_VALUE_INPUT, &json!("JsonNull")).unwrap(),
        json!({"$null": "JsonNull"})
    );
    assert!(!v.accepts(JSON_NULL_VALUE_INPUT, &json!("DbNull")));

    assert_eq!(
        v.validate(NULLABLE_JSON_NULL_VALUE_INPUT, &json!("DbNull")).unwrap(),
        json!({"$null": "DbNull"})
    );
    assert!(!v.accepts(NULLABLE_JSON_NULL_VALUE_INPUT, &json!("AnyNull")));
}

/// The filter enum maps DbNull to the JsonNull marker.
#[test]
fn test_filter_sentinel_db_null_collapses() {
    let v = validator();
    assert_eq!(
        v.validate(JSON_NULL_VALUE_FILTER, &json!("DbNull")).unwrap(),
        json!({"$null": "JsonNull"})
    );
    assert_eq!(
        v.validate(JSON_NULL_VALUE_FILTER, &json!("AnyNull")).unwrap(),
        json!({"$null": "AnyNull"})
    );
}

/// The marker shape is never a document, so a normalized DbNull cannot be
/// mistaken for a stored value.
#[test]
fn test_marker_shape_reserved_in_documents() {
    let v = validator();
    let marker = NullMarker::DbNull.to_value();

    for schema in [JSON_VALUE, INPUT_JSON_VALUE] {
        let err = v.validate(schema, &marker).unwrap_err();
        assert!(err.issues().iter().any(|i| i.code == IssueCode::ConstraintViolation));
    }
    let err = v
        .validate(NULLABLE_JSON_VALUE, &json!({"payload": {"$null": "DbNull"}}))
        .unwrap_err();
    assert_eq!(err.issues()[0].path.to_string(), "payload");
    assert!(!v.accepts(INPUT_JSON_VALUE, &json!([{"$null": "JsonNull"}])));

    // Lookalikes with extra keys or unknown names are ordinary documents
    let extra = json!({"$null": "DbNull", "note": "kept"});
    let out = v.validate(NULLABLE_JSON_VALUE, &extra).unwrap();
    assert_eq!(NullableJson::from_normalized(&out), NullableJson::Value(extra));
    assert!(v.accepts(JSON_VALUE, &json!({"$null": "Other"})));

    // Normalized markers validate again unchanged
    let db_null = v.validate(NULLABLE_JSON_VALUE, &Value::Null).unwrap();
    assert_eq!(v.validate(NULLABLE_JSON_VALUE, &db_null).unwrap(), db_null);
    let filter = v.validate(JSON_NULL_VALUE_FILTER, &json!("AnyNull")).unwrap();
    assert_eq!(v.validate(JSON_NULL_VALUE_FILTER, &filter).unwrap(), filter);
    assert!(!v.accepts(JSON_NULL_VALUE_INPUT, &NullMarker::DbNull.to_value()));
}

// =============================================================================
// Serializable Leaf Tests
// =============================================================================

struct Salary {
    amount: i64,
}

impl Serializable for Salary {
    fn to_json(&self) -> Value {
        json!({"amount": self.amount, "currency": "EUR"})
    }
}

/// Serializable leaves validate as opaque values and expand on demand.
#[test]
fn test_serializable_leaf() {
    let doc = InputJson::Array(vec![
        Some(InputJson::Serializable(Arc::new(Salary { amount: 72000 }))),
        None,
        Some(InputJson::Bool(true)),
    ]);
    doc.validate(&validator()).unwrap();
    assert_eq!(
        doc.expand(),
        json!([{"amount": 72000, "currency": "EUR"}, null, true])
    );
    assert!(format!("{:?}", doc).contains("Serializable(..)"));
}
