//! Entity schema variants
//!
//! Eight read-side shapes per model. All of them strip undeclared keys.
//! Relations only appear in the `*Relations*` variants, as lazy references
//! to the related model's relation-carrying schema. `WithRelations` requires
//! every relation key: to-many relations are arrays and optional to-one
//! relations may be `null` or absent. The partial variants make every
//! relation key omittable. Cyclic graphs (Job -> Department -> User -> Job)
//! close on `[]` or `null`.

use crate::model::{ModelDef, RelationField, ScalarField, ScalarKind};

use super::errors::SchemaResult;
use super::json;
use super::node::{Node, ObjectNode};
use super::primitive::field_node;
use super::registry::RegistryBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityVariant {
    Base,
    Partial,
    OptionalDefaults,
    WithRelations,
    PartialWithRelations,
    OptionalDefaultsWithRelations,
    WithPartialRelations,
    OptionalDefaultsWithPartialRelations,
}

impl EntityVariant {
    pub const ALL: [EntityVariant; 8] = [
        EntityVariant::Base,
        EntityVariant::Partial,
        EntityVariant::OptionalDefaults,
        EntityVariant::WithRelations,
        EntityVariant::PartialWithRelations,
        EntityVariant::OptionalDefaultsWithRelations,
        EntityVariant::WithPartialRelations,
        EntityVariant::OptionalDefaultsWithPartialRelations,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            EntityVariant::Base => "Schema",
            EntityVariant::Partial => "PartialSchema",
            EntityVariant::OptionalDefaults => "OptionalDefaultsSchema",
            EntityVariant::WithRelations => "WithRelationsSchema",
            EntityVariant::PartialWithRelations => "PartialWithRelationsSchema",
            EntityVariant::OptionalDefaultsWithRelations => "OptionalDefaultsWithRelationsSchema",
            EntityVariant::WithPartialRelations => "WithPartialRelationsSchema",
            EntityVariant::OptionalDefaultsWithPartialRelations => {
                "OptionalDefaultsWithPartialRelationsSchema"
            }
        }
    }

    pub fn schema_name(&self, model: &str) -> String {
        format!("{}{}", model, self.suffix())
    }

    /// Variant the related models are referenced through, if any.
    fn related(&self) -> Option<EntityVariant> {
        match self {
            EntityVariant::Base | EntityVariant::Partial | EntityVariant::OptionalDefaults => None,
            EntityVariant::WithRelations | EntityVariant::OptionalDefaultsWithRelations => {
                Some(EntityVariant::WithRelations)
            }
            EntityVariant::PartialWithRelations
            | EntityVariant::WithPartialRelations
            | EntityVariant::OptionalDefaultsWithPartialRelations => {
                Some(EntityVariant::PartialWithRelations)
            }
        }
    }

    /// True where relation keys may be left out.
    fn partial_relations(&self) -> bool {
        matches!(
            self,
            EntityVariant::PartialWithRelations
                | EntityVariant::WithPartialRelations
                | EntityVariant::OptionalDefaultsWithPartialRelations
        )
    }
}

/// Node for a column value, nullability included.
fn value_node(model: &ModelDef, field: &ScalarField) -> SchemaResult<Node> {
    if field.kind == ScalarKind::Json {
        return Ok(if field.nullable {
            Node::reference(json::NULLABLE_JSON_VALUE)
        } else {
            Node::reference(json::JSON_VALUE)
        });
    }
    let node = field_node(&model.name, field)?;
    Ok(if field.nullable { node.nullable() } else { node })
}

fn base_shape(model: &ModelDef) -> SchemaResult<ObjectNode> {
    let mut obj = ObjectNode::strip();
    for field in &model.fields {
        let node = value_node(model, field)?;
        let node = if field.nullable { node.optional() } else { node };
        obj = obj.field(&field.name, node);
    }
    Ok(obj)
}

fn optional_defaults_shape(model: &ModelDef) -> SchemaResult<ObjectNode> {
    let mut obj = base_shape(model)?;
    for field in &model.fields {
        if let Some(rule) = field.default_rule() {
            obj = obj.field(&field.name, value_node(model, field)?.with_default(rule));
        }
    }
    Ok(obj)
}

fn relation_node(relation: &RelationField, related: EntityVariant, omittable: bool) -> Node {
    let target = Node::reference(related.schema_name(&relation.target));
    let node = if relation.is_many() {
        target.array()
    } else if relation.optional {
        target.nullable()
    } else {
        target
    };
    if omittable || (relation.optional && !relation.is_many()) {
        node.optional()
    } else {
        node
    }
}

fn variant_shape(model: &ModelDef, variant: EntityVariant) -> SchemaResult<ObjectNode> {
    let scalars = match variant {
        EntityVariant::Base | EntityVariant::WithRelations | EntityVariant::WithPartialRelations => {
            base_shape(model)?
        }
        EntityVariant::Partial | EntityVariant::PartialWithRelations => base_shape(model)?.partial(),
        EntityVariant::OptionalDefaults
        | EntityVariant::OptionalDefaultsWithRelations
        | EntityVariant::OptionalDefaultsWithPartialRelations => optional_defaults_shape(model)?,
    };
    let Some(related) = variant.related() else {
        return Ok(scalars);
    };
    let omittable = variant.partial_relations();
    Ok(model.relations.iter().fold(scalars, |obj, relation| {
        obj.field(&relation.name, relation_node(relation, related, omittable))
    }))
}

/// Declares every entity variant of one model.
pub fn declare(builder: &mut RegistryBuilder, model: &ModelDef) -> SchemaResult<()> {
    for variant in EntityVariant::ALL {
        let shape = variant_shape(model, variant)?;
        builder.declare_for(&model.name, variant.schema_name(&model.name), shape.into())?;
    }
    Ok(())
}
