//! Create and update inputs
//!
//! Checked inputs connect related rows only through relation envelopes and
//! never expose foreign-key columns. Unchecked inputs write foreign-key
//! columns directly and drop the owning relations those columns back.
//!
//! For every relation field `F` declared on model `T`, the "without" family
//! describes writing a `T` from the other side of `F`, so `F` itself is left
//! out. The inverse side's cardinality decides which envelope the family
//! ends in: a to-many inverse gets the `CreateNestedMany`/`UpdateMany`
//! envelopes, a to-one inverse the `CreateNestedOne`/`UpdateOne` ones.

use crate::model::{Catalog, ModelDef, RelationField, ScalarField, ScalarKind};

use super::errors::SchemaResult;
use super::filter::{field_update_ops_name, scalar_where_input_name, where_input_name, where_unique_input_name};
use super::json;
use super::node::{Node, ObjectNode};
use super::primitive::{capitalize, field_node};
use super::registry::RegistryBuilder;

pub fn create_input_name(model: &str) -> String {
    format!("{}CreateInput", model)
}

pub fn unchecked_create_input_name(model: &str) -> String {
    format!("{}UncheckedCreateInput", model)
}

pub fn update_input_name(model: &str) -> String {
    format!("{}UpdateInput", model)
}

pub fn unchecked_update_input_name(model: &str) -> String {
    format!("{}UncheckedUpdateInput", model)
}

pub fn create_many_input_name(model: &str) -> String {
    format!("{}CreateManyInput", model)
}

pub fn update_many_mutation_input_name(model: &str) -> String {
    format!("{}UpdateManyMutationInput", model)
}

pub fn unchecked_update_many_input_name(model: &str) -> String {
    format!("{}UncheckedUpdateManyInput", model)
}

fn unchecked(flag: bool) -> &'static str {
    if flag {
        "Unchecked"
    } else {
        ""
    }
}

/// An owning, mandatory to-one relation must be supplied on create.
fn is_required_one(relation: &RelationField) -> bool {
    relation.is_owning() && !relation.optional && !relation.is_many()
}

/// Envelope used by a create input for `relation`.
pub fn create_envelope_name(relation: &RelationField, unchecked_flag: bool) -> String {
    format!(
        "{}{}CreateNested{}Without{}Input",
        relation.target,
        unchecked(unchecked_flag),
        if relation.is_many() { "Many" } else { "One" },
        capitalize(&relation.inverse)
    )
}

/// Envelope used by an update input for `relation`.
pub fn update_envelope_name(relation: &RelationField, unchecked_flag: bool) -> String {
    let target = &relation.target;
    let field = capitalize(&relation.inverse);
    if relation.is_many() {
        format!(
            "{}{}UpdateManyWithout{}NestedInput",
            target,
            unchecked(unchecked_flag),
            field
        )
    } else if is_required_one(relation) {
        format!("{}UpdateOneRequiredWithout{}NestedInput", target, field)
    } else {
        format!(
            "{}{}UpdateOneWithout{}NestedInput",
            target,
            unchecked(unchecked_flag),
            field
        )
    }
}

/// Column node in create context; columns with a default may be omitted.
fn create_scalar(model: &ModelDef, field: &ScalarField) -> SchemaResult<Node> {
    if field.kind == ScalarKind::Json {
        return Ok(if field.nullable {
            Node::union(vec![
                Node::reference(json::NULLABLE_JSON_NULL_VALUE_INPUT),
                Node::reference(json::INPUT_JSON_VALUE),
            ])
            .optional()
        } else {
            Node::union(vec![
                Node::reference(json::JSON_NULL_VALUE_INPUT),
                Node::reference(json::INPUT_JSON_VALUE),
            ])
        });
    }
    let node = field_node(&model.name, field)?;
    Ok(if field.nullable {
        node.nullish()
    } else if field.has_default() {
        node.optional()
    } else {
        node
    })
}

/// Column node in update context: a value or an operations object.
fn update_scalar(model: &ModelDef, field: &ScalarField) -> SchemaResult<Node> {
    if field.kind == ScalarKind::Json {
        let sentinel = if field.nullable {
            json::NULLABLE_JSON_NULL_VALUE_INPUT
        } else {
            json::JSON_NULL_VALUE_INPUT
        };
        return Ok(Node::union(vec![
            Node::reference(sentinel),
            Node::reference(json::INPUT_JSON_VALUE),
        ])
        .optional());
    }
    let value = field_node(&model.name, field)?;
    let value = if field.nullable { value.nullable() } else { value };
    Ok(Node::union(vec![
        value,
        Node::reference(field_update_ops_name(&field.kind, field.nullable)),
    ])
    .optional())
}

fn create_scalars(
    model: &ModelDef,
    keep: impl Fn(&ScalarField) -> bool,
) -> SchemaResult<ObjectNode> {
    let mut obj = ObjectNode::strict();
    for field in model.fields.iter().filter(|f| keep(*f)) {
        obj = obj.field(&field.name, create_scalar(model, field)?);
    }
    Ok(obj)
}

fn update_scalars(
    model: &ModelDef,
    keep: impl Fn(&ScalarField) -> bool,
) -> SchemaResult<ObjectNode> {
    let mut obj = ObjectNode::strict();
    for field in model.fields.iter().filter(|f| keep(*f)) {
        obj = obj.field(&field.name, update_scalar(model, field)?);
    }
    Ok(obj)
}

fn create_relations(
    obj: ObjectNode,
    model: &ModelDef,
    skip: Option<&str>,
    unchecked_flag: bool,
) -> ObjectNode {
    model
        .relations
        .iter()
        .filter(|r| Some(r.name.as_str()) != skip)
        .filter(|r| !(unchecked_flag && r.is_owning()))
        .fold(obj, |obj, relation| {
            let node = Node::reference(create_envelope_name(relation, unchecked_flag));
            let node = if !unchecked_flag && is_required_one(relation) {
                node
            } else {
                node.optional()
            };
            obj.field(&relation.name, node)
        })
}

fn update_relations(
    obj: ObjectNode,
    model: &ModelDef,
    skip: Option<&str>,
    unchecked_flag: bool,
) -> ObjectNode {
    model
        .relations
        .iter()
        .filter(|r| Some(r.name.as_str()) != skip)
        .filter(|r| !(unchecked_flag && r.is_owning()))
        .fold(obj, |obj, relation| {
            obj.field(
                &relation.name,
                Node::reference(update_envelope_name(relation, unchecked_flag)).optional(),
            )
        })
}

/// Declares the mutation inputs of one model and the "without" family of
/// each of its relation fields.
pub fn declare(builder: &mut RegistryBuilder, catalog: &Catalog, model: &ModelDef) -> SchemaResult<()> {
    let m = model.name.as_str();
    let checked = |f: &ScalarField| !model.is_foreign_key(&f.name);
    let all = |_: &ScalarField| true;

    let create = create_relations(create_scalars(model, checked)?, model, None, false);
    builder.declare_for(m, create_input_name(m), create.into())?;

    let unchecked_create = create_relations(create_scalars(model, all)?, model, None, true);
    builder.declare_for(m, unchecked_create_input_name(m), unchecked_create.into())?;

    let update = update_relations(update_scalars(model, checked)?, model, None, false);
    builder.declare_for(m, update_input_name(m), update.into())?;

    let unchecked_update = update_relations(update_scalars(model, all)?, model, None, true);
    builder.declare_for(m, unchecked_update_input_name(m), unchecked_update.into())?;

    builder.declare_for(m, create_many_input_name(m), create_scalars(model, all)?.into())?;
    builder.declare_for(
        m,
        update_many_mutation_input_name(m),
        update_scalars(model, checked)?.into(),
    )?;
    builder.declare_for(
        m,
        unchecked_update_many_input_name(m),
        update_scalars(model, all)?.into(),
    )?;

    for field in &model.relations {
        declare_without_family(builder, catalog, model, field)?;
    }
    Ok(())
}

/// Names shared by both branches of one "without" family.
struct Family<'a> {
    model: &'a ModelDef,
    field: String,
}

impl Family<'_> {
    fn name(&self, stem: &str) -> String {
        format!("{}{}Without{}Input", self.model.name, stem, self.field)
    }

    fn create_data(&self) -> Node {
        Node::union(vec![
            Node::reference(self.name("Create")),
            Node::reference(self.name("UncheckedCreate")),
        ])
    }

    fn update_data(&self) -> Node {
        Node::union(vec![
            Node::reference(self.name("Update")),
            Node::reference(self.name("UncheckedUpdate")),
        ])
    }

    fn where_unique(&self) -> Node {
        Node::reference(where_unique_input_name(&self.model.name))
    }

    fn where_input(&self) -> Node {
        Node::reference(where_input_name(&self.model.name))
    }
}

fn declare_without_family(
    builder: &mut RegistryBuilder,
    catalog: &Catalog,
    model: &ModelDef,
    field: &RelationField,
) -> SchemaResult<()> {
    let m = model.name.as_str();
    let inverse = catalog.inverse_of(field)?;
    let family = Family {
        model,
        field: capitalize(&field.name),
    };
    let checked = |f: &ScalarField| !model.is_foreign_key(&f.name);
    let own_columns = |f: &ScalarField| !field.fields.contains(&f.name);
    let skip = Some(field.name.as_str());

    builder.declare_for(
        m,
        family.name("Create"),
        create_relations(create_scalars(model, checked)?, model, skip, false).into(),
    )?;
    builder.declare_for(
        m,
        family.name("UncheckedCreate"),
        create_relations(create_scalars(model, own_columns)?, model, skip, true).into(),
    )?;
    builder.declare_for(
        m,
        family.name("Update"),
        update_relations(update_scalars(model, checked)?, model, skip, false).into(),
    )?;
    builder.declare_for(
        m,
        family.name("UncheckedUpdate"),
        update_relations(update_scalars(model, own_columns)?, model, skip, true).into(),
    )?;
    builder.declare_for(
        m,
        family.name("CreateOrConnect"),
        ObjectNode::strict()
            .field("where", family.where_unique())
            .field("create", family.create_data())
            .into(),
    )?;

    if inverse.is_many() {
        declare_many_envelopes(builder, &family, model, field)
    } else {
        declare_one_envelopes(builder, &family, inverse)
    }
}

fn declare_many_envelopes(
    builder: &mut RegistryBuilder,
    family: &Family<'_>,
    model: &ModelDef,
    field: &RelationField,
) -> SchemaResult<()> {
    let m = model.name.as_str();
    let f = &family.field;
    let own_columns = |c: &ScalarField| !field.fields.contains(&c.name);
    let many = Node::one_or_many;

    let create_many = format!("{}CreateMany{}Input", m, f);
    let envelope = format!("{}CreateMany{}InputEnvelope", m, f);
    builder.declare_for(m, &create_many, create_scalars(model, own_columns)?.into())?;
    builder.declare_for(
        m,
        &envelope,
        ObjectNode::strict()
            .field("data", many(Node::reference(&create_many)))
            .field("skipDuplicates", Node::Boolean.optional())
            .into(),
    )?;

    builder.declare_for(
        m,
        family.name("UpsertWithWhereUnique"),
        ObjectNode::strict()
            .field("where", family.where_unique())
            .field("update", family.update_data())
            .field("create", family.create_data())
            .into(),
    )?;
    builder.declare_for(
        m,
        family.name("UpdateWithWhereUnique"),
        ObjectNode::strict()
            .field("where", family.where_unique())
            .field("data", family.update_data())
            .into(),
    )?;
    builder.declare_for(
        m,
        family.name("UncheckedUpdateMany"),
        update_scalars(model, own_columns)?.into(),
    )?;
    builder.declare_for(
        m,
        family.name("UpdateManyWithWhere"),
        ObjectNode::strict()
            .field("where", Node::reference(scalar_where_input_name(m)))
            .field(
                "data",
                Node::union(vec![
                    Node::reference(update_many_mutation_input_name(m)),
                    Node::reference(family.name("UncheckedUpdateMany")),
                ]),
            )
            .into(),
    )?;

    let create_side = ObjectNode::strict()
        .field("create", many(family.create_data()).optional())
        .field(
            "connectOrCreate",
            many(Node::reference(family.name("CreateOrConnect"))).optional(),
        )
        .field("createMany", Node::reference(&envelope).optional())
        .field("connect", many(family.where_unique()).optional());

    let nested_create = format!("{}CreateNestedManyWithout{}Input", m, f);
    builder.declare_for(m, &nested_create, create_side.clone().into())?;
    builder.alias(
        m,
        format!("{}UncheckedCreateNestedManyWithout{}Input", m, f),
        &nested_create,
    )?;

    let mut update_side = create_side.field(
        "upsert",
        many(Node::reference(family.name("UpsertWithWhereUnique"))).optional(),
    );
    for op in ["set", "disconnect", "delete", "connect"] {
        update_side = update_side.field(op, many(family.where_unique()).optional());
    }
    update_side = update_side
        .field(
            "update",
            many(Node::reference(family.name("UpdateWithWhereUnique"))).optional(),
        )
        .field(
            "updateMany",
            many(Node::reference(family.name("UpdateManyWithWhere"))).optional(),
        )
        .field(
            "deleteMany",
            many(Node::reference(scalar_where_input_name(m))).optional(),
        );

    let nested_update = format!("{}UpdateManyWithout{}NestedInput", m, f);
    builder.declare_for(m, &nested_update, update_side.into())?;
    builder.alias(
        m,
        format!("{}UncheckedUpdateManyWithout{}NestedInput", m, f),
        &nested_update,
    )
}

fn declare_one_envelopes(
    builder: &mut RegistryBuilder,
    family: &Family<'_>,
    inverse: &RelationField,
) -> SchemaResult<()> {
    let m = family.model.name.as_str();

    builder.declare_for(
        m,
        family.name("Upsert"),
        ObjectNode::strict()
            .field("update", family.update_data())
            .field("create", family.create_data())
            .field("where", family.where_input().optional())
            .into(),
    )?;
    builder.declare_for(
        m,
        family.name("UpdateToOneWithWhere"),
        ObjectNode::strict()
            .field("where", family.where_input().optional())
            .field("data", family.update_data())
            .into(),
    )?;

    let create_side = ObjectNode::strict()
        .field("create", family.create_data().optional())
        .field(
            "connectOrCreate",
            Node::reference(family.name("CreateOrConnect")).optional(),
        )
        .field("connect", family.where_unique().optional());

    let nested_create = create_envelope_name(inverse, false);
    builder.declare_for(m, &nested_create, create_side.clone().into())?;

    let mut update_side = create_side
        .field("upsert", Node::reference(family.name("Upsert")).optional())
        .field(
            "update",
            Node::union(vec![
                Node::reference(family.name("UpdateToOneWithWhere")),
                Node::reference(family.name("Update")),
                Node::reference(family.name("UncheckedUpdate")),
            ])
            .optional(),
        );
    if !is_required_one(inverse) {
        for op in ["disconnect", "delete"] {
            update_side = update_side.field(
                op,
                Node::union(vec![Node::Boolean, family.where_input()]).optional(),
            );
        }
    }
    let nested_update = update_envelope_name(inverse, false);
    builder.declare_for(m, &nested_update, update_side.into())?;

    if !inverse.is_owning() {
        builder.alias(m, create_envelope_name(inverse, true), &nested_create)?;
        builder.alias(m, update_envelope_name(inverse, true), &nested_update)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::recruiting()
    }

    #[test]
    fn test_envelope_names() {
        let catalog = catalog();
        let job = catalog.model("Job").unwrap();
        let department = job.relation_named("department").unwrap();
        assert_eq!(
            create_envelope_name(department, false),
            "DepartmentCreateNestedOneWithoutJobsInput"
        );
        assert_eq!(
            update_envelope_name(department, false),
            "DepartmentUpdateOneRequiredWithoutJobsNestedInput"
        );

        let user = catalog.model("User").unwrap();
        let profile = user.relation_named("profile").unwrap();
        assert_eq!(
            update_envelope_name(profile, true),
            "ProfileUncheckedUpdateOneWithoutUserNestedInput"
        );
        let jobs = user.relation_named("jobs").unwrap();
        assert_eq!(
            create_envelope_name(jobs, true),
            "JobUncheckedCreateNestedManyWithoutCreatedByInput"
        );
    }

    #[test]
    fn test_optional_owning_relation_is_not_required() {
        let catalog = catalog();
        let resume = catalog.model("Resume").unwrap();
        let candidate = resume.relation_named("candidate").unwrap();
        assert!(!is_required_one(candidate));
        assert_eq!(
            update_envelope_name(candidate, false),
            "CandidateUpdateOneWithoutResumesNestedInput"
        );
    }

    #[test]
    fn test_checked_create_hides_foreign_keys() {
        let catalog = catalog();
        let job = catalog.model("Job").unwrap();
        let checked = create_relations(
            create_scalars(job, |f| !job.is_foreign_key(&f.name)).unwrap(),
            job,
            None,
            false,
        );
        assert!(!checked.declares("departmentId"));
        assert!(checked.declares("department"));
        assert!(!checked.get("department").unwrap().accepts_absent());

        let unchecked = create_relations(create_scalars(job, |_| true).unwrap(), job, None, true);
        assert!(unchecked.declares("departmentId"));
        assert!(!unchecked.declares("department"));
        assert!(unchecked.declares("candidates"));
    }
}
