//! Validator algebra for the recruiting data model
//!
//! Every schema the catalog implies is built once into a `Registry` of
//! named `Node`s and checked by a `Validator`.
//!
//! # Families
//!
//! - Entity variants (`UserSchema`, `JobPartialWithRelationsSchema`, ...)
//! - Scalar filters and where inputs (`StringNullableFilter`, `JobWhereInput`)
//! - Orderings and aggregates (`UserOrderByWithRelationInput`)
//! - Mutation inputs and nested envelopes (`CandidateCreateInput`)
//! - Operation arguments (`ResumeFindManyArgs`)
//! - JSON value and null-marker schemas
//!
//! References between schemas are lazy, so recursive families resolve
//! without eager expansion.

mod config;
mod entity;
mod errors;
mod eval;
mod filter;
mod json;
mod mutation;
mod node;
mod ops;
mod primitive;
mod projection;
mod registry;
mod unique;
mod validator;

pub use config::ValidationConfig;
pub use entity::EntityVariant;
pub use errors::{
    FieldPath, IssueCategory, IssueCode, PathSegment, SchemaError, SchemaResult, ValidationError,
    ValidationIssue,
};
pub use eval::matches;
pub use filter::{
    compound_unique_input_name, order_by_with_aggregation_name, order_by_with_relation_name,
    scalar_filter_name, scalar_where_input_name, where_input_name, where_unique_input_name,
};
pub use json::{
    InputJson, NullMarker, NullableJson, Serializable, Transform, INPUT_JSON_VALUE,
    JSON_NULL_VALUE_FILTER, JSON_NULL_VALUE_INPUT, JSON_VALUE, MARKER_KEY, NULLABLE_JSON_NULL_VALUE_INPUT,
    NULLABLE_JSON_VALUE,
};
pub use mutation::{
    create_input_name, unchecked_create_input_name, unchecked_update_input_name,
    update_input_name,
};
pub use node::{Node, ObjectNode, UniqueNode, UnknownKeys};
pub use ops::{Arithmetic, FieldOp};
pub use primitive::{coerce_datetime, enum_schema_name, Check, CheckKind};
pub use projection::scalar_field_enum_name;
pub use registry::{registry, Registry, RegistryBuilder};
pub use unique::{unique_key_names, unique_matches, UniqueMatch};
pub use validator::Validator;
