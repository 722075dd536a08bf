//! Model catalog type definitions
//!
//! A catalog is the declarative description of a relational data model:
//! enums, models, scalar fields (kind, nullability, uniqueness, default
//! rule, constraints), relations and compound unique keys. Every validator
//! in `schema` is derived from it.
//!
//! Catalogs are plain data and round-trip through JSON so the output of an
//! external schema generator can be loaded from disk (see `ModelLoader`).

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{SchemaError, SchemaResult};

/// Semantic type of a scalar column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScalarKind {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Boolean,
    /// Timestamp; inputs are coerced (RFC 3339, plain date, epoch millis)
    #[serde(rename = "datetime")]
    DateTime,
    /// Opaque JSON document
    Json,
    /// Member of a named catalog enum
    Enum {
        /// Enum name as declared in the catalog
        #[serde(rename = "enum")]
        name: String,
    },
}

impl ScalarKind {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "bool",
            ScalarKind::DateTime => "date",
            ScalarKind::Json => "json",
            ScalarKind::Enum { name } => name,
        }
    }

    /// Stem used when naming the shared per-type schemas
    /// (`StringFilter`, `EnumRoleNullableFilter`, `BoolFieldUpdateOperationsInput`).
    pub fn stem(&self) -> String {
        match self {
            ScalarKind::String => "String".into(),
            ScalarKind::Int => "Int".into(),
            ScalarKind::Float => "Float".into(),
            ScalarKind::Boolean => "Bool".into(),
            ScalarKind::DateTime => "DateTime".into(),
            ScalarKind::Json => "Json".into(),
            ScalarKind::Enum { name } => format!("Enum{}", name),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float)
    }

    /// Kinds supporting `lt/lte/gt/gte`
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            ScalarKind::String | ScalarKind::Int | ScalarKind::Float | ScalarKind::DateTime
        )
    }

    /// Kinds supporting `in/notIn`
    pub fn is_listable(&self) -> bool {
        !matches!(self, ScalarKind::Boolean | ScalarKind::Json)
    }
}

/// Rule used to synthesize a value when a field is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum DefaultRule {
    /// Random UUID v4
    Uuid,
    /// Current timestamp
    Now,
    /// Fixed literal (boolean, enum member, number)
    Literal(Value),
}

/// Field-level constraint kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum ConstraintKind {
    MinLength { value: usize },
    MaxLength { value: usize },
    Pattern { value: String },
    Email,
    Url,
    Uuid,
    Positive,
    NonNegative,
    Min { value: f64 },
    Max { value: f64 },
}

/// A constraint with the message surfaced when it is violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(flatten)]
    pub kind: ConstraintKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Scalar column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    pub name: String,
    #[serde(flatten)]
    pub kind: ScalarKind,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub id: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultRule>,
    /// Refreshed by the store on every write
    #[serde(default)]
    pub updated_at: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl ScalarField {
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            id: false,
            unique: false,
            default: None,
            updated_at: false,
            constraints: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::String)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::Boolean)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::DateTime)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::Json)
    }

    pub fn enumeration(name: impl Into<String>, enum_name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::Enum { name: enum_name.into() })
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_to(mut self, rule: DefaultRule) -> Self {
        self.default = Some(rule);
        self
    }

    pub fn updated_at(mut self) -> Self {
        self.updated_at = true;
        self
    }

    pub fn check(mut self, kind: ConstraintKind, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint {
            kind,
            message: Some(message.into()),
        });
        self
    }

    /// Returns the rule used when the field is omitted, if any.
    ///
    /// Updated-at columns behave like `Now`.
    pub fn default_rule(&self) -> Option<DefaultRule> {
        match &self.default {
            Some(rule) => Some(rule.clone()),
            None if self.updated_at => Some(DefaultRule::Now),
            None => None,
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some() || self.updated_at
    }

    /// True if the field alone addresses exactly one row
    pub fn is_unique_key(&self) -> bool {
        self.id || self.unique
    }
}

/// Relation cardinality as seen from the declaring model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// Relation field definition.
///
/// The owning side lists its foreign-key scalars in `fields`; the other side
/// leaves `fields` empty. `inverse` names the opposite relation field on
/// `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationField {
    pub name: String,
    pub target: String,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    pub inverse: String,
}

impl RelationField {
    /// Owning to-one relation backed by local foreign-key columns.
    pub fn belongs_to(
        name: impl Into<String>,
        target: impl Into<String>,
        fields: &[&str],
        references: &[&str],
        inverse: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::One,
            optional: false,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            references: references.iter().map(|f| f.to_string()).collect(),
            inverse: inverse.into(),
        }
    }

    /// Non-owning to-many relation.
    pub fn has_many(
        name: impl Into<String>,
        target: impl Into<String>,
        inverse: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::Many,
            optional: false,
            fields: Vec::new(),
            references: Vec::new(),
            inverse: inverse.into(),
        }
    }

    /// Non-owning optional to-one relation.
    pub fn has_one(
        name: impl Into<String>,
        target: impl Into<String>,
        inverse: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::One,
            optional: true,
            fields: Vec::new(),
            references: Vec::new(),
            inverse: inverse.into(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_owning(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn is_many(&self) -> bool {
        self.cardinality == Cardinality::Many
    }
}

/// Named compound unique key, e.g. `candidateId_jobId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKey {
    pub name: String,
    pub fields: Vec<String>,
}

impl UniqueKey {
    /// Compound key named after its fields joined by `_`
    pub fn over(fields: &[&str]) -> Self {
        Self {
            name: fields.join("_"),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Model (entity) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    pub name: String,
    pub fields: Vec<ScalarField>,
    #[serde(default)]
    pub relations: Vec<RelationField>,
    #[serde(default)]
    pub unique_keys: Vec<UniqueKey>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
            unique_keys: Vec::new(),
        }
    }

    pub fn field(mut self, field: ScalarField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn relation(mut self, relation: RelationField) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn unique_key(mut self, key: UniqueKey) -> Self {
        self.unique_keys.push(key);
        self
    }

    pub fn scalar(&self, name: &str) -> Option<&ScalarField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relation_named(&self, name: &str) -> Option<&RelationField> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Foreign-key scalars of every owning relation
    pub fn foreign_keys(&self) -> HashSet<&str> {
        self.relations
            .iter()
            .flat_map(|r| r.fields.iter().map(String::as_str))
            .collect()
    }

    pub fn is_foreign_key(&self, field: &str) -> bool {
        self.relations
            .iter()
            .any(|r| r.fields.iter().any(|f| f == field))
    }

    /// Single-column unique fields (ids first, in declaration order)
    pub fn unique_fields(&self) -> Vec<&ScalarField> {
        let mut out: Vec<&ScalarField> = self.fields.iter().filter(|f| f.id).collect();
        out.extend(self.fields.iter().filter(|f| f.unique && !f.id));
        out
    }

    pub fn has_many_relations(&self) -> bool {
        self.relations.iter().any(RelationField::is_many)
    }

    pub fn has_numeric_fields(&self) -> bool {
        self.fields.iter().any(|f| f.kind.is_numeric())
    }
}

/// Complete data model: enums plus models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub models: Vec<ModelDef>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enum(mut self, def: EnumDef) -> Self {
        self.enums.push(def);
        self
    }

    pub fn with_model(mut self, model: ModelDef) -> Self {
        self.models.push(model);
        self
    }

    pub fn model(&self, name: &str) -> Option<&ModelDef> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Looks up a model, reporting a missing one as a construction error.
    pub fn require_model(&self, name: &str) -> SchemaResult<&ModelDef> {
        self.model(name)
            .ok_or_else(|| SchemaError::invalid_model(name, "model is not declared"))
    }

    /// Returns the inverse side of `relation` declared on `model`.
    pub fn inverse_of(&self, relation: &RelationField) -> SchemaResult<&RelationField> {
        let target = self.require_model(&relation.target)?;
        target.relation_named(&relation.inverse).ok_or_else(|| {
            SchemaError::invalid_model(
                &relation.target,
                format!("missing inverse relation '{}'", relation.inverse),
            )
        })
    }

    /// Appends the enums and models of another catalog fragment.
    ///
    /// Redeclaring an enum or model is an error.
    pub fn merge(&mut self, other: Catalog) -> SchemaResult<()> {
        for def in other.enums {
            if self.enum_def(&def.name).is_some() {
                return Err(SchemaError::invalid_model(&def.name, "enum declared twice"));
            }
            self.enums.push(def);
        }
        for model in other.models {
            if self.model(&model.name).is_some() {
                return Err(SchemaError::invalid_model(&model.name, "model declared twice"));
            }
            self.models.push(model);
        }
        Ok(())
    }

    /// Validates the catalog structure itself (not a document).
    pub fn validate_structure(&self) -> SchemaResult<()> {
        let mut enum_names = HashSet::new();
        for def in &self.enums {
            if !enum_names.insert(def.name.as_str()) {
                return Err(SchemaError::invalid_model(&def.name, "enum declared twice"));
            }
            if def.values.is_empty() {
                return Err(SchemaError::invalid_model(&def.name, "enum has no values"));
            }
        }

        let mut model_names = HashSet::new();
        for model in &self.models {
            if !model_names.insert(model.name.as_str()) {
                return Err(SchemaError::invalid_model(&model.name, "model declared twice"));
            }
            self.validate_model(model)?;
        }

        Ok(())
    }

    fn validate_model(&self, model: &ModelDef) -> SchemaResult<()> {
        let mut names = HashSet::new();
        for field in &model.fields {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::invalid_model(
                    &model.name,
                    format!("field '{}' declared twice", field.name),
                ));
            }
            if let ScalarKind::Enum { name } = &field.kind {
                if self.enum_def(name).is_none() {
                    return Err(SchemaError::invalid_model(
                        &model.name,
                        format!("field '{}' uses unknown enum '{}'", field.name, name),
                    ));
                }
            }
            for constraint in &field.constraints {
                if let ConstraintKind::Pattern { value } = &constraint.kind {
                    Regex::new(value).map_err(|e| {
                        SchemaError::invalid_pattern(&model.name, &field.name, e.to_string())
                    })?;
                }
            }
        }

        for relation in &model.relations {
            if !names.insert(relation.name.as_str()) {
                return Err(SchemaError::invalid_model(
                    &model.name,
                    format!("relation '{}' clashes with another field", relation.name),
                ));
            }
            self.validate_relation(model, relation)?;
        }

        for key in &model.unique_keys {
            if key.fields.len() < 2 {
                return Err(SchemaError::invalid_model(
                    &model.name,
                    format!("compound key '{}' needs at least two fields", key.name),
                ));
            }
            if let Some(missing) = key.fields.iter().find(|f| model.scalar(f).is_none()) {
                return Err(SchemaError::invalid_model(
                    &model.name,
                    format!("compound key '{}' uses unknown field '{}'", key.name, missing),
                ));
            }
        }

        if model.unique_fields().is_empty() && model.unique_keys.is_empty() {
            return Err(SchemaError::invalid_model(
                &model.name,
                "model declares no unique key",
            ));
        }

        Ok(())
    }

    fn validate_relation(&self, model: &ModelDef, relation: &RelationField) -> SchemaResult<()> {
        let inverse = self.inverse_of(relation)?;
        if inverse.target != model.name || inverse.inverse != relation.name {
            return Err(SchemaError::invalid_model(
                &model.name,
                format!(
                    "relation '{}' and '{}.{}' do not point at each other",
                    relation.name, relation.target, relation.inverse
                ),
            ));
        }
        if relation.is_owning() == inverse.is_owning() {
            return Err(SchemaError::invalid_model(
                &model.name,
                format!("relation '{}' needs exactly one owning side", relation.name),
            ));
        }
        if relation.is_owning() {
            if relation.is_many() {
                return Err(SchemaError::invalid_model(
                    &model.name,
                    format!("owning relation '{}' must be to-one", relation.name),
                ));
            }
            if relation.fields.len() != relation.references.len() {
                return Err(SchemaError::invalid_model(
                    &model.name,
                    format!("relation '{}' fields and references differ in length", relation.name),
                ));
            }
            if let Some(missing) = relation.fields.iter().find(|f| model.scalar(f).is_none()) {
                return Err(SchemaError::invalid_model(
                    &model.name,
                    format!("relation '{}' uses unknown field '{}'", relation.name, missing),
                ));
            }
            let target = self.require_model(&relation.target)?;
            if let Some(missing) = relation.references.iter().find(|f| target.scalar(f).is_none()) {
                return Err(SchemaError::invalid_model(
                    &model.name,
                    format!("relation '{}' references unknown field '{}'", relation.name, missing),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_catalog() -> Catalog {
        Catalog::new()
            .with_model(
                ModelDef::new("Author")
                    .field(ScalarField::string("id").id())
                    .relation(RelationField::has_many("posts", "Post", "author")),
            )
            .with_model(
                ModelDef::new("Post")
                    .field(ScalarField::string("id").id())
                    .field(ScalarField::string("authorId"))
                    .relation(RelationField::belongs_to(
                        "author",
                        "Author",
                        &["authorId"],
                        &["id"],
                        "posts",
                    )),
            )
    }

    #[test]
    fn test_valid_catalog_structure() {
        assert!(tiny_catalog().validate_structure().is_ok());
    }

    #[test]
    fn test_missing_inverse_rejected() {
        let mut catalog = tiny_catalog();
        catalog.models[0].relations[0].inverse = "writer".into();
        let err = catalog.validate_structure().unwrap_err();
        assert!(err.to_string().contains("writer"));
    }

    #[test]
    fn test_both_sides_owning_rejected() {
        let mut catalog = tiny_catalog();
        catalog.models[0].relations[0].fields = vec!["id".into()];
        catalog.models[0].relations[0].references = vec!["id".into()];
        assert!(catalog.validate_structure().is_err());
    }

    #[test]
    fn test_unknown_enum_rejected() {
        let catalog = Catalog::new().with_model(
            ModelDef::new("Thing")
                .field(ScalarField::string("id").id())
                .field(ScalarField::enumeration("kind", "Kind")),
        );
        let err = catalog.validate_structure().unwrap_err();
        assert!(err.to_string().contains("Kind"));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let catalog = Catalog::new().with_model(
            ModelDef::new("Thing")
                .field(ScalarField::string("id").id())
                .field(
                    ScalarField::string("code")
                        .check(ConstraintKind::Pattern { value: "(".into() }, "bad code"),
                ),
        );
        assert!(matches!(
            catalog.validate_structure(),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_model_without_unique_key_rejected() {
        let catalog =
            Catalog::new().with_model(ModelDef::new("Loose").field(ScalarField::string("name")));
        assert!(catalog.validate_structure().is_err());
    }

    #[test]
    fn test_kind_stems() {
        assert_eq!(ScalarKind::Boolean.stem(), "Bool");
        assert_eq!(ScalarKind::Enum { name: "Role".into() }.stem(), "EnumRole");
        assert!(ScalarKind::DateTime.is_ordered());
        assert!(!ScalarKind::Boolean.is_listable());
    }

    #[test]
    fn test_updated_at_defaults_to_now() {
        let field = ScalarField::datetime("updatedAt").updated_at();
        assert!(field.has_default());
        assert_eq!(field.default_rule(), Some(DefaultRule::Now));
    }

    #[test]
    fn test_field_json_shape() {
        let field: ScalarField = serde_json::from_str(
            r#"{"name":"role","type":"enum","enum":"Role","nullable":true}"#,
        )
        .unwrap();
        assert_eq!(field, ScalarField::enumeration("role", "Role").nullable());

        let json = serde_json::to_value(ScalarField::string("email").unique()).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["unique"], true);
    }

    #[test]
    fn test_merge_rejects_duplicates() {
        let mut catalog = tiny_catalog();
        let err = catalog.merge(tiny_catalog()).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }
}
