//! Named schema registry
//!
//! Construction happens in two passes. Generators first declare every named
//! node (declaration order is irrelevant, nodes may reference names that are
//! declared later). `finish` then checks that every `Ref` resolves and that
//! no schema can reach itself without passing through a container, so
//! validation always makes progress through the input.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use crate::model::Catalog;
use crate::observability::{Logger, ObservationScope};

use super::errors::{SchemaError, SchemaResult};
use super::node::Node;
use super::{entity, filter, json, mutation, primitive, projection};

/// Collects named nodes before they are checked and frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    schemas: HashMap<String, Node>,
    by_model: BTreeMap<String, Vec<String>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a shared schema.
    pub fn declare(&mut self, name: impl Into<String>, node: Node) -> SchemaResult<()> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateSchema(name));
        }
        self.schemas.insert(name, node);
        Ok(())
    }

    /// Declares a schema derived from one model.
    pub fn declare_for(
        &mut self,
        model: &str,
        name: impl Into<String>,
        node: Node,
    ) -> SchemaResult<()> {
        let name = name.into();
        self.declare(name.clone(), node)?;
        self.by_model.entry(model.to_string()).or_default().push(name);
        Ok(())
    }

    /// Declares `name` as another name for `target`.
    pub fn alias(&mut self, model: &str, name: impl Into<String>, target: &str) -> SchemaResult<()> {
        self.declare_for(model, name, Node::reference(target))
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Second pass: verifies references and freezes the registry.
    pub fn finish(self, catalog: Catalog) -> SchemaResult<Registry> {
        let mut names: Vec<&String> = self.schemas.keys().collect();
        names.sort();

        for name in &names {
            let mut refs = Vec::new();
            self.schemas[*name].collect_refs(&mut refs);
            if let Some(target) = refs.iter().find(|r| !self.schemas.contains_key(**r)) {
                return Err(SchemaError::UnresolvedReference {
                    from: name.to_string(),
                    target: target.to_string(),
                });
            }
        }

        for name in &names {
            self.check_guarded(name)?;
        }

        let mut by_model = self.by_model;
        for list in by_model.values_mut() {
            list.sort();
        }

        Ok(Registry {
            schemas: self.schemas,
            by_model,
            catalog,
        })
    }

    /// Follows references reachable without entering a container and fails
    /// if `start` is among them.
    fn check_guarded(&self, start: &str) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        let mut pending = vec![start.to_string()];
        while let Some(name) = pending.pop() {
            let Some(node) = self.schemas.get(&name) else {
                continue;
            };
            let mut refs = Vec::new();
            unguarded_refs(node, &mut refs);
            for target in refs {
                if target == start {
                    return Err(SchemaError::UnguardedRecursion(start.to_string()));
                }
                if seen.insert(target.to_string()) {
                    pending.push(target.to_string());
                }
            }
        }
        Ok(())
    }
}

fn unguarded_refs<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    match node {
        Node::Ref(name) => out.push(name),
        Node::Optional(inner)
        | Node::Nullable(inner)
        | Node::Default(inner, _)
        | Node::Transform(inner, _)
        | Node::Except(inner, _) => unguarded_refs(inner, out),
        Node::Union(variants) => variants.iter().for_each(|v| unguarded_refs(v, out)),
        _ => {}
    }
}

/// Frozen set of named schemas derived from one catalog.
#[derive(Debug)]
pub struct Registry {
    schemas: HashMap<String, Node>,
    by_model: BTreeMap<String, Vec<String>>,
    catalog: Catalog,
}

impl Registry {
    /// Derives every schema for a catalog.
    pub fn build(catalog: Catalog) -> SchemaResult<Self> {
        let scope = ObservationScope::new("SCHEMA_REGISTRY_BUILD");

        let result = Self::build_inner(catalog);
        match &result {
            Ok(registry) => {
                scope.complete_with_fields(&[
                    ("models", &registry.catalog.models.len().to_string()),
                    ("schemas", &registry.len().to_string()),
                ]);
            }
            Err(e) => scope.fail(&e.to_string()),
        }
        result
    }

    fn build_inner(catalog: Catalog) -> SchemaResult<Self> {
        catalog.validate_structure()?;

        let mut builder = RegistryBuilder::new();
        json::declare(&mut builder)?;
        filter::declare_shared(&mut builder, &catalog)?;
        for def in &catalog.enums {
            builder.declare(
                primitive::enum_schema_name(&def.name),
                Node::enumeration(&def.name, &def.values),
            )?;
        }
        for model in &catalog.models {
            entity::declare(&mut builder, model)?;
            filter::declare_model(&mut builder, model)?;
            mutation::declare(&mut builder, &catalog, model)?;
            projection::declare(&mut builder, model)?;
        }
        builder.finish(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// All schema names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names derived from one model, sorted
    pub fn names_for_model(&self, model: &str) -> &[String] {
        self.by_model.get(model).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

static RECRUITING: OnceLock<Registry> = OnceLock::new();

/// Registry for the built-in recruiting catalog, built on first use.
pub fn registry() -> &'static Registry {
    RECRUITING.get_or_init(|| match Registry::build(Catalog::recruiting()) {
        Ok(registry) => registry,
        Err(e) => {
            Logger::fatal("SCHEMA_REGISTRY_INVALID", &[("error", &e.to_string())]);
            panic!("built-in recruiting catalog is invalid: {}", e);
        }
    })
}
