//! Selection, inclusion and operation argument schemas
//!
//! These wrap the filter and mutation inputs into the argument objects of
//! each query operation (`UserFindManyArgs`, `JobUpsertArgs`, ...).

use crate::model::ModelDef;

use super::errors::SchemaResult;
use super::filter::{
    order_by_with_aggregation_name, order_by_with_relation_name,
    scalar_where_with_aggregates_name, where_input_name, where_unique_input_name,
};
use super::mutation::{
    create_input_name, create_many_input_name, unchecked_create_input_name,
    unchecked_update_input_name, unchecked_update_many_input_name, update_input_name,
    update_many_mutation_input_name,
};
use super::node::{Node, ObjectNode};
use super::primitive::{Check, CheckKind};
use super::registry::RegistryBuilder;

pub fn scalar_field_enum_name(model: &str) -> String {
    format!("{}ScalarFieldEnum", model)
}

fn reference(model: &str, suffix: &str) -> Node {
    Node::reference(format!("{}{}", model, suffix))
}

fn either(first: String, second: String) -> Node {
    Node::union(vec![Node::reference(first), Node::reference(second)])
}

/// `select` and `include` entries for a model
fn projection(obj: ObjectNode, model: &ModelDef, m: &str) -> ObjectNode {
    let obj = obj.field("select", reference(m, "Select").nullable().optional());
    if model.relations.is_empty() {
        obj
    } else {
        obj.field("include", reference(m, "Include").nullable().optional())
    }
}

fn paging(obj: ObjectNode) -> ObjectNode {
    obj.field("take", Node::int().optional()).field(
        "skip",
        Node::Number {
            integer: true,
            checks: vec![Check::new(CheckKind::NonNegative)],
        }
        .optional(),
    )
}

fn relation_entries(obj: ObjectNode, model: &ModelDef) -> ObjectNode {
    let mut obj = model.relations.iter().fold(obj, |obj, relation| {
        let args = if relation.is_many() {
            reference(&relation.target, "FindManyArgs")
        } else {
            reference(&relation.target, "Args")
        };
        obj.field(&relation.name, Node::union(vec![Node::Boolean, args]).optional())
    });
    if model.has_many_relations() {
        obj = obj.field(
            "_count",
            Node::union(vec![Node::Boolean, reference(&model.name, "CountOutputTypeArgs")])
                .optional(),
        );
    }
    obj
}

/// Declares projection and operation argument schemas of one model.
pub fn declare(builder: &mut RegistryBuilder, model: &ModelDef) -> SchemaResult<()> {
    let m = model.name.as_str();
    let where_unique = || Node::reference(where_unique_input_name(m));
    let where_input = || Node::reference(where_input_name(m)).optional();
    let field_enum = || Node::reference(scalar_field_enum_name(m));

    let scalar_names: Vec<String> = model.fields.iter().map(|f| f.name.clone()).collect();
    builder.declare_for(
        m,
        scalar_field_enum_name(m),
        Node::enumeration(scalar_field_enum_name(m), &scalar_names),
    )?;

    let select = model.fields.iter().fold(ObjectNode::strict(), |obj, field| {
        obj.field(&field.name, Node::Boolean.optional())
    });
    builder.declare_for(m, format!("{}Select", m), relation_entries(select, model).into())?;
    if !model.relations.is_empty() {
        builder.declare_for(
            m,
            format!("{}Include", m),
            relation_entries(ObjectNode::strict(), model).into(),
        )?;
    }
    builder.declare_for(
        m,
        format!("{}Args", m),
        projection(ObjectNode::strict(), model, m).into(),
    )?;

    if model.has_many_relations() {
        let counted = model
            .relations
            .iter()
            .filter(|r| r.is_many())
            .fold(ObjectNode::strict(), |obj, relation| {
                let args = ObjectNode::strict().field(
                    "where",
                    Node::reference(where_input_name(&relation.target)).optional(),
                );
                obj.field(
                    &relation.name,
                    Node::union(vec![Node::Boolean, args.into()]).optional(),
                )
            });
        builder.declare_for(m, format!("{}CountOutputTypeSelect", m), counted.into())?;
        builder.declare_for(
            m,
            format!("{}CountOutputTypeArgs", m),
            ObjectNode::strict()
                .field("select", reference(m, "CountOutputTypeSelect").nullable().optional())
                .into(),
        )?;
    }

    builder.declare_for(
        m,
        format!("{}FindUniqueArgs", m),
        projection(ObjectNode::strict(), model, m)
            .field("where", where_unique())
            .into(),
    )?;

    for op in ["FindFirst", "FindMany"] {
        let args = projection(ObjectNode::strict(), model, m)
            .field("where", where_input())
            .field(
                "orderBy",
                Node::one_or_many(Node::reference(order_by_with_relation_name(m))).optional(),
            )
            .field("cursor", where_unique().optional())
            .field("distinct", Node::one_or_many(field_enum()).optional());
        builder.declare_for(m, format!("{}{}Args", m, op), paging(args).into())?;
    }

    builder.declare_for(
        m,
        format!("{}CreateArgs", m),
        projection(ObjectNode::strict(), model, m)
            .field("data", either(create_input_name(m), unchecked_create_input_name(m)))
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}UpsertArgs", m),
        projection(ObjectNode::strict(), model, m)
            .field("where", where_unique())
            .field("create", either(create_input_name(m), unchecked_create_input_name(m)))
            .field("update", either(update_input_name(m), unchecked_update_input_name(m)))
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}CreateManyArgs", m),
        ObjectNode::strict()
            .field("data", Node::one_or_many(Node::reference(create_many_input_name(m))))
            .field("skipDuplicates", Node::Boolean.optional())
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}UpdateArgs", m),
        projection(ObjectNode::strict(), model, m)
            .field("data", either(update_input_name(m), unchecked_update_input_name(m)))
            .field("where", where_unique())
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}UpdateManyArgs", m),
        ObjectNode::strict()
            .field(
                "data",
                either(
                    update_many_mutation_input_name(m),
                    unchecked_update_many_input_name(m),
                ),
            )
            .field("where", where_input())
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}DeleteArgs", m),
        projection(ObjectNode::strict(), model, m)
            .field("where", where_unique())
            .into(),
    )?;
    builder.declare_for(
        m,
        format!("{}DeleteManyArgs", m),
        ObjectNode::strict().field("where", where_input()).into(),
    )?;

    let group_by = ObjectNode::strict()
        .field("where", where_input())
        .field(
            "orderBy",
            Node::one_or_many(Node::reference(order_by_with_aggregation_name(m))).optional(),
        )
        .field("by", Node::one_or_many(field_enum()))
        .field(
            "having",
            Node::reference(scalar_where_with_aggregates_name(m)).optional(),
        );
    builder.declare_for(m, format!("{}GroupByArgs", m), paging(group_by).into())
}
