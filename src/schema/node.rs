//! Schema node algebra
//!
//! Every validator in the registry is a `Node` tree built from a handful of
//! combinators: primitives, containers, unions, optionality wrappers,
//! defaults, transforms, and `Ref`, a by-name reference resolved through the
//! registry at validation time. `Ref` is what lets schemas refer to
//! themselves (`JsonValueSchema`, `NOT`, nested `not` filters) and to peers
//! that are declared later (User -> Job -> Department -> User).

use serde_json::Value;

use crate::model::DefaultRule;

use super::json::Transform;
use super::primitive::Check;

/// How an object treats keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Undeclared keys are reported
    Strict,
    /// Undeclared keys are dropped from the output
    Strip,
}

/// Object shape: declared fields in declaration order.
#[derive(Debug, Clone)]
pub struct ObjectNode {
    fields: Vec<(String, Node)>,
    unknown_keys: UnknownKeys,
}

impl ObjectNode {
    pub fn strict() -> Self {
        Self {
            fields: Vec::new(),
            unknown_keys: UnknownKeys::Strict,
        }
    }

    pub fn strip() -> Self {
        Self {
            fields: Vec::new(),
            unknown_keys: UnknownKeys::Strip,
        }
    }

    /// Adds a field, replacing an existing one with the same name.
    pub fn field(mut self, name: impl Into<String>, node: Node) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = node,
            None => self.fields.push((name, node)),
        }
        self
    }

    /// Adds every field of `other`; `other` wins on name clashes.
    pub fn merge(mut self, other: ObjectNode) -> Self {
        for (name, node) in other.fields {
            self = self.field(name, node);
        }
        self
    }

    pub fn without(mut self, names: &[&str]) -> Self {
        self.fields.retain(|(n, _)| !names.contains(&n.as_str()));
        self
    }

    /// Every field becomes omittable.
    pub fn partial(mut self) -> Self {
        for (_, node) in self.fields.iter_mut() {
            if !node.accepts_absent() {
                *node = node.clone().optional();
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    pub fn fields(&self) -> &[(String, Node)] {
        &self.fields
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    pub fn declares(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Where-unique shape: an object that must carry at least one unique key.
#[derive(Debug, Clone)]
pub struct UniqueNode {
    /// Top-level key names that each identify one row
    pub keys: Vec<String>,
    pub body: ObjectNode,
}

#[derive(Debug, Clone)]
pub enum Node {
    String(Vec<Check>),
    Number { integer: bool, checks: Vec<Check> },
    Boolean,
    /// Coerced timestamp, normalized to RFC 3339
    DateTime,
    Enum { name: String, values: Vec<String> },
    Literal(Value),
    Array(Box<Node>),
    /// Object with arbitrary keys, every value matching the inner node
    Record(Box<Node>),
    Object(ObjectNode),
    /// First matching variant wins
    Union(Vec<Node>),
    /// May be omitted from its parent object
    Optional(Box<Node>),
    Nullable(Box<Node>),
    /// May be omitted; the rule synthesizes a value when it is
    Default(Box<Node>, DefaultRule),
    Transform(Box<Node>, Transform),
    /// Inner node minus the listed values, which are rejected as reserved
    Except(Box<Node>, Vec<Value>),
    /// Lazy reference to a registered schema
    Ref(String),
    Unique(UniqueNode),
}

impl Node {
    pub fn string() -> Self {
        Node::String(Vec::new())
    }

    pub fn int() -> Self {
        Node::Number {
            integer: true,
            checks: Vec::new(),
        }
    }

    pub fn float() -> Self {
        Node::Number {
            integer: false,
            checks: Vec::new(),
        }
    }

    pub fn literal(value: Value) -> Self {
        Node::Literal(value)
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Node::Ref(name.into())
    }

    pub fn enumeration(name: impl Into<String>, values: &[String]) -> Self {
        Node::Enum {
            name: name.into(),
            values: values.to_vec(),
        }
    }

    pub fn union(variants: Vec<Node>) -> Self {
        Node::Union(variants)
    }

    /// A single item or an array of items
    pub fn one_or_many(node: Node) -> Self {
        Node::Union(vec![node.clone(), node.array()])
    }

    pub fn array(self) -> Self {
        Node::Array(Box::new(self))
    }

    pub fn optional(self) -> Self {
        Node::Optional(Box::new(self))
    }

    pub fn nullable(self) -> Self {
        Node::Nullable(Box::new(self))
    }

    /// Accepts `null` or omission
    pub fn nullish(self) -> Self {
        self.nullable().optional()
    }

    pub fn with_default(self, rule: DefaultRule) -> Self {
        Node::Default(Box::new(self), rule)
    }

    pub fn transform(self, transform: Transform) -> Self {
        Node::Transform(Box::new(self), transform)
    }

    pub fn except(self, reserved: Vec<Value>) -> Self {
        Node::Except(Box::new(self), reserved)
    }

    /// True if a parent object may omit this field
    pub fn accepts_absent(&self) -> bool {
        matches!(self, Node::Optional(_) | Node::Default(..))
    }

    /// Short type description for error messages
    pub fn describe(&self) -> String {
        match self {
            Node::String(_) => "string".into(),
            Node::Number { integer: true, .. } => "int".into(),
            Node::Number { integer: false, .. } => "number".into(),
            Node::Boolean => "bool".into(),
            Node::DateTime => "date".into(),
            Node::Enum { name, .. } => name.clone(),
            Node::Literal(v) => v.to_string(),
            Node::Array(inner) => format!("array of {}", inner.describe()),
            Node::Record(_) | Node::Object(_) | Node::Unique(_) => "object".into(),
            Node::Union(variants) => variants
                .iter()
                .map(Node::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            Node::Optional(inner)
            | Node::Default(inner, _)
            | Node::Transform(inner, _)
            | Node::Except(inner, _) => inner.describe(),
            Node::Nullable(inner) => format!("{} | null", inner.describe()),
            Node::Ref(name) => name.clone(),
        }
    }

    /// Collects every registry name this node refers to.
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Ref(name) => out.push(name),
            Node::Array(inner)
            | Node::Record(inner)
            | Node::Optional(inner)
            | Node::Nullable(inner)
            | Node::Default(inner, _)
            | Node::Transform(inner, _)
            | Node::Except(inner, _) => inner.collect_refs(out),
            Node::Union(variants) => variants.iter().for_each(|v| v.collect_refs(out)),
            Node::Object(obj) => obj.fields.iter().for_each(|(_, n)| n.collect_refs(out)),
            Node::Unique(unique) => unique
                .body
                .fields
                .iter()
                .for_each(|(_, n)| n.collect_refs(out)),
            Node::String(_)
            | Node::Number { .. }
            | Node::Boolean
            | Node::DateTime
            | Node::Enum { .. }
            | Node::Literal(_) => {}
        }
    }
}

impl From<ObjectNode> for Node {
    fn from(obj: ObjectNode) -> Self {
        Node::Object(obj)
    }
}
