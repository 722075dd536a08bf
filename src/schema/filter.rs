//! Filter, ordering and where-input algebra
//!
//! Shared schemas are declared once per scalar kind:
//! - `{Nested}{Stem}{Nullable}{WithAggregates}Filter` for every combination
//! - `{Nullable}{Stem}FieldUpdateOperationsInput`
//! - `SortOrderSchema`, `NullsOrderSchema`, `QueryModeSchema`, `SortOrderInput`
//!
//! Per model `M`:
//! - `MWhereInput`, `MScalarWhereInput`, `MScalarWhereWithAggregatesInput`
//! - `MWhereUniqueInput` and one `M{Key}CompoundUniqueInput` per compound key
//! - `MRelationFilter`, `MNullableRelationFilter`, `MListRelationFilter`
//! - `MOrderByWithRelationInput`, `MOrderByWithAggregationInput`,
//!   `MOrderByRelationAggregateInput` and the per-aggregate order inputs

use crate::model::{Catalog, ModelDef, RelationField, ScalarField, ScalarKind};

use super::errors::SchemaResult;
use super::json;
use super::node::{Node, ObjectNode, UniqueNode};
use super::primitive::{kind_node, pascal_case};
use super::registry::RegistryBuilder;
use super::unique::unique_key_names;

pub const SORT_ORDER: &str = "SortOrderSchema";
pub const NULLS_ORDER: &str = "NullsOrderSchema";
pub const QUERY_MODE: &str = "QueryModeSchema";
pub const SORT_ORDER_INPUT: &str = "SortOrderInput";

const NUMERIC_OPS: [&str; 4] = ["increment", "decrement", "multiply", "divide"];

pub fn scalar_filter_name(kind: &ScalarKind, nullable: bool, nested: bool, aggregates: bool) -> String {
    format!(
        "{}{}{}{}Filter",
        if nested { "Nested" } else { "" },
        kind.stem(),
        if nullable { "Nullable" } else { "" },
        if aggregates { "WithAggregates" } else { "" },
    )
}

pub fn field_update_ops_name(kind: &ScalarKind, nullable: bool) -> String {
    format!(
        "{}{}FieldUpdateOperationsInput",
        if nullable { "Nullable" } else { "" },
        kind.stem()
    )
}

pub fn where_input_name(model: &str) -> String {
    format!("{}WhereInput", model)
}

pub fn where_unique_input_name(model: &str) -> String {
    format!("{}WhereUniqueInput", model)
}

pub fn scalar_where_input_name(model: &str) -> String {
    format!("{}ScalarWhereInput", model)
}

pub fn scalar_where_with_aggregates_name(model: &str) -> String {
    format!("{}ScalarWhereWithAggregatesInput", model)
}

pub fn compound_unique_input_name(model: &str, key: &str) -> String {
    format!("{}{}CompoundUniqueInput", model, pascal_case(key))
}

pub fn order_by_with_relation_name(model: &str) -> String {
    format!("{}OrderByWithRelationInput", model)
}

pub fn order_by_with_aggregation_name(model: &str) -> String {
    format!("{}OrderByWithAggregationInput", model)
}

fn members(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Scalar kinds every catalog gets filters for, plus its enums.
fn filter_kinds(catalog: &Catalog) -> Vec<ScalarKind> {
    let mut kinds = vec![
        ScalarKind::String,
        ScalarKind::Int,
        ScalarKind::Float,
        ScalarKind::Boolean,
        ScalarKind::DateTime,
        ScalarKind::Json,
    ];
    kinds.extend(catalog.enums.iter().map(|e| ScalarKind::Enum {
        name: e.name.clone(),
    }));
    kinds
}

/// Declares ordering enums, scalar filters and update operations.
pub fn declare_shared(builder: &mut RegistryBuilder, catalog: &Catalog) -> SchemaResult<()> {
    builder.declare(SORT_ORDER, Node::enumeration("SortOrder", &members(&["asc", "desc"])))?;
    builder.declare(NULLS_ORDER, Node::enumeration("NullsOrder", &members(&["first", "last"])))?;
    builder.declare(
        QUERY_MODE,
        Node::enumeration("QueryMode", &members(&["default", "insensitive"])),
    )?;
    builder.declare(
        SORT_ORDER_INPUT,
        ObjectNode::strict()
            .field("sort", Node::reference(SORT_ORDER))
            .field("nulls", Node::reference(NULLS_ORDER).optional())
            .into(),
    )?;

    for kind in filter_kinds(catalog) {
        for nullable in [false, true] {
            for nested in [false, true] {
                for aggregates in [false, true] {
                    let node = if kind == ScalarKind::Json {
                        json_filter(nullable, aggregates)
                    } else {
                        scalar_filter(&kind, nullable, nested, aggregates)
                    };
                    builder.declare(scalar_filter_name(&kind, nullable, nested, aggregates), node)?;
                }
            }
            if kind != ScalarKind::Json {
                builder.declare(field_update_ops_name(&kind, nullable), update_ops(&kind, nullable))?;
            }
        }
    }
    Ok(())
}

fn scalar_filter(kind: &ScalarKind, nullable: bool, nested: bool, aggregates: bool) -> Node {
    let value = kind_node(kind);
    let maybe_null = |node: Node| if nullable { node.nullable() } else { node };

    let mut obj = ObjectNode::strict().field("equals", maybe_null(value.clone()).optional());
    if kind.is_listable() {
        obj = obj
            .field("in", maybe_null(value.clone().array()).optional())
            .field("notIn", maybe_null(value.clone().array()).optional());
    }
    if kind.is_ordered() {
        for op in ["lt", "lte", "gt", "gte"] {
            obj = obj.field(op, value.clone().optional());
        }
    }
    if *kind == ScalarKind::String {
        for op in ["contains", "startsWith", "endsWith"] {
            obj = obj.field(op, Node::string().optional());
        }
        if !nested {
            obj = obj.field("mode", Node::reference(QUERY_MODE).optional());
        }
    }
    let not = Node::union(vec![
        value,
        Node::reference(scalar_filter_name(kind, nullable, true, aggregates)),
    ]);
    obj = obj.field("not", maybe_null(not).optional());

    if aggregates {
        obj = with_aggregates(obj, kind, nullable);
    }
    obj.into()
}

fn with_aggregates(obj: ObjectNode, kind: &ScalarKind, nullable: bool) -> ObjectNode {
    let nested = |k: &ScalarKind| Node::reference(scalar_filter_name(k, nullable, true, false)).optional();
    let mut obj = obj
        .field("_count", nested(&ScalarKind::Int))
        .field("_min", nested(kind))
        .field("_max", nested(kind));
    if kind.is_numeric() {
        obj = obj
            .field("_avg", nested(&ScalarKind::Float))
            .field("_sum", nested(kind));
    }
    obj
}

/// Json columns filter by document value, path and array/string probes.
/// Nested variants share the same shape.
fn json_filter(nullable: bool, aggregates: bool) -> Node {
    let input = || Node::reference(json::INPUT_JSON_VALUE);
    // Sentinel names first so "DbNull" is never read as a plain string.
    let value = || {
        Node::union(vec![
            Node::reference(json::JSON_NULL_VALUE_FILTER),
            input(),
        ])
    };

    let mut obj = ObjectNode::strict()
        .field("equals", value().optional())
        .field("path", Node::string().array().optional());
    for op in ["string_contains", "string_starts_with", "string_ends_with"] {
        obj = obj.field(op, Node::string().optional());
    }
    for op in ["array_contains", "array_starts_with", "array_ends_with"] {
        obj = obj.field(op, input().nullable().optional());
    }
    for op in ["lt", "lte", "gt", "gte"] {
        obj = obj.field(op, input().optional());
    }
    obj = obj.field("not", value().optional());

    if aggregates {
        obj = with_aggregates(obj, &ScalarKind::Json, nullable);
    }
    obj.into()
}

/// Exactly one operation per column, so every accepted object decodes to a `FieldOp`.
fn update_ops(kind: &ScalarKind, nullable: bool) -> Node {
    let value = kind_node(kind);
    let set = if nullable {
        value.clone().nullable()
    } else {
        value.clone()
    };
    let mut ops = vec![("set", set)];
    if kind.is_numeric() {
        ops.extend(NUMERIC_OPS.iter().map(|op| (*op, value.clone())));
    }
    Node::union(
        ops.into_iter()
            .map(|(op, node)| ObjectNode::strict().field(op, node).into())
            .collect(),
    )
}

/// Where-input field for a scalar column: a filter or a bare value.
fn scalar_where_field(field: &ScalarField, aggregates: bool) -> Node {
    let filter = Node::reference(scalar_filter_name(&field.kind, field.nullable, false, aggregates));
    if field.kind == ScalarKind::Json {
        return filter.optional();
    }
    let node = Node::union(vec![filter, kind_node(&field.kind)]);
    if field.nullable {
        node.nullable().optional()
    } else {
        node.optional()
    }
}

fn relation_where_field(relation: &RelationField) -> Node {
    let target = &relation.target;
    if relation.is_many() {
        return Node::reference(format!("{}ListRelationFilter", target)).optional();
    }
    let filter = if relation.optional {
        format!("{}NullableRelationFilter", target)
    } else {
        format!("{}RelationFilter", target)
    };
    let node = Node::union(vec![
        Node::reference(filter),
        Node::reference(where_input_name(target)),
    ]);
    if relation.optional {
        node.nullable().optional()
    } else {
        node.optional()
    }
}

fn where_shape(model: &ModelDef, self_name: &str, aggregates: bool, relations: bool) -> ObjectNode {
    let combinator = || Node::one_or_many(Node::reference(self_name)).optional();
    let mut obj = ObjectNode::strict()
        .field("AND", combinator())
        .field("OR", combinator())
        .field("NOT", combinator());
    for field in &model.fields {
        obj = obj.field(&field.name, scalar_where_field(field, aggregates));
    }
    if relations {
        for relation in &model.relations {
            obj = obj.field(&relation.name, relation_where_field(relation));
        }
    }
    obj
}

fn where_unique(model: &ModelDef) -> Node {
    let mut body = where_shape(model, &where_input_name(&model.name), false, true);
    for field in model.unique_fields() {
        body = body.field(&field.name, kind_node(&field.kind).optional());
    }
    for key in &model.unique_keys {
        body = body.field(
            &key.name,
            Node::reference(compound_unique_input_name(&model.name, &key.name)).optional(),
        );
    }
    Node::Unique(UniqueNode {
        keys: unique_key_names(model),
        body,
    })
}

fn sort_field(field: &ScalarField) -> Node {
    let node = if field.nullable {
        Node::union(vec![
            Node::reference(SORT_ORDER),
            Node::reference(SORT_ORDER_INPUT),
        ])
    } else {
        Node::reference(SORT_ORDER)
    };
    node.optional()
}

fn sort_all<'a>(fields: impl Iterator<Item = &'a ScalarField>) -> ObjectNode {
    fields.fold(ObjectNode::strict(), |obj, field| {
        obj.field(&field.name, Node::reference(SORT_ORDER).optional())
    })
}

/// Declares the where, relation-filter and ordering schemas of one model.
pub fn declare_model(builder: &mut RegistryBuilder, model: &ModelDef) -> SchemaResult<()> {
    let m = model.name.as_str();
    let where_name = where_input_name(m);

    builder.declare_for(m, &where_name, where_shape(model, &where_name, false, true).into())?;
    builder.declare_for(
        m,
        scalar_where_input_name(m),
        where_shape(model, &scalar_where_input_name(m), false, false).into(),
    )?;
    builder.declare_for(
        m,
        scalar_where_with_aggregates_name(m),
        where_shape(model, &scalar_where_with_aggregates_name(m), true, false).into(),
    )?;

    builder.declare_for(m, where_unique_input_name(m), where_unique(model))?;
    for key in &model.unique_keys {
        let shape = key.fields.iter().fold(ObjectNode::strict(), |obj, name| {
            let kind = model
                .scalar(name)
                .map(|f| kind_node(&f.kind))
                .unwrap_or_else(Node::string);
            obj.field(name, kind)
        });
        builder.declare_for(m, compound_unique_input_name(m, &key.name), shape.into())?;
    }

    let related = || Node::reference(&where_name).optional();
    let related_or_null = || Node::reference(&where_name).nullable().optional();
    builder.declare_for(
        m,
        format!("{}RelationFilter", m),
        ObjectNode::strict()
            .field("is", related())
            .field("isNot", related())
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}NullableRelationFilter", m),
        ObjectNode::strict()
            .field("is", related_or_null())
            .field("isNot", related_or_null())
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}ListRelationFilter", m),
        ObjectNode::strict()
            .field("every", related())
            .field("some", related())
            .field("none", related())
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}OrderByRelationAggregateInput", m),
        ObjectNode::strict()
            .field("_count", Node::reference(SORT_ORDER).optional())
            .into(),
    )?;

    declare_ordering(builder, model)
}

fn declare_ordering(builder: &mut RegistryBuilder, model: &ModelDef) -> SchemaResult<()> {
    let m = model.name.as_str();

    let mut with_relation = ObjectNode::strict();
    for field in &model.fields {
        with_relation = with_relation.field(&field.name, sort_field(field));
    }
    for relation in &model.relations {
        let target = if relation.is_many() {
            format!("{}OrderByRelationAggregateInput", relation.target)
        } else {
            order_by_with_relation_name(&relation.target)
        };
        with_relation = with_relation.field(&relation.name, Node::reference(target).optional());
    }
    builder.declare_for(m, order_by_with_relation_name(m), with_relation.into())?;

    let ordered = || model.fields.iter().filter(|f| f.kind != ScalarKind::Json);
    let numeric = || model.fields.iter().filter(|f| f.kind.is_numeric());

    let mut aggregates = vec![
        ("Count", sort_all(model.fields.iter())),
        ("Max", sort_all(ordered())),
        ("Min", sort_all(ordered())),
    ];
    if model.has_numeric_fields() {
        aggregates.push(("Avg", sort_all(numeric())));
        aggregates.push(("Sum", sort_all(numeric())));
    }

    let mut with_aggregation = ObjectNode::strict();
    for field in &model.fields {
        with_aggregation = with_aggregation.field(&field.name, sort_field(field));
    }
    for (label, shape) in aggregates {
        let name = format!("{}{}OrderByAggregateInput", m, label);
        with_aggregation = with_aggregation.field(
            format!("_{}", label.to_lowercase()),
            Node::reference(&name).optional(),
        );
        builder.declare_for(m, name, shape.into())?;
    }
    builder.declare_for(m, order_by_with_aggregation_name(m), with_aggregation.into())
}
