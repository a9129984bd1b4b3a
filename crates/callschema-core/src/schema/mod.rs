//! Schema node model
//!
//! A [`SchemaNode`] is the closed set of shapes extraction can produce. Each
//! node knows how to project itself into a tool-call JSON schema
//! ([`SchemaNode::json_schema`]) and how to evaluate untrusted JSON into a
//! [`Native`](crate::Native) value ([`SchemaNode::eval`]). Nodes are built once
//! and never mutated; derived nodes are new values.
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

mod eval;
mod project;

#[cfg(test)]
mod tests;

pub use eval::EvalContext;

use crate::annotation::{Annotation, LiteralValue, Origin};
use crate::native::Constructor;
use serde::Serialize;
use std::fmt;

/// Scalar leaf kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Int,
    Float,
    Str,
    Bool,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Str => "str",
            PrimitiveKind::Bool => "bool",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Schema tree node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Undefined(UndefinedNode),
    Primitive(PrimitiveNode),
    Sequence(SequenceNode),
    Tuple(TupleNode),
    Mapping(MappingNode),
    Union(UnionNode),
    Literal(LiteralNode),
    Object(ObjectNode),
}

/// Missing, `Any` or `None` annotation
#[derive(Debug, Clone, PartialEq)]
pub struct UndefinedNode {
    /// `Annotation::Any` for missing or `Any`, `Annotation::None` for `None`
    pub original: Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveNode {
    pub kind: PrimitiveKind,
}

/// Homogeneous ordered collection
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceNode {
    /// `list` or `tuple` (for `tuple[T, ...]`)
    pub container: Origin,
    pub item: Box<SchemaNode>,
}

/// Fixed-arity heterogeneous collection
#[derive(Debug, Clone, PartialEq)]
pub struct TupleNode {
    pub container: Origin,
    pub items: Vec<SchemaNode>,
}

/// Key-value collection
#[derive(Debug, Clone, PartialEq)]
pub struct MappingNode {
    pub container: Origin,
    pub key: Box<SchemaNode>,
    pub value: Box<SchemaNode>,
}

/// Sum of alternatives; a `None` option means the value may be null
#[derive(Debug, Clone, PartialEq)]
pub struct UnionNode {
    pub options: Vec<Option<SchemaNode>>,
}

impl UnionNode {
    pub fn is_optional(&self) -> bool {
        self.options.iter().any(Option::is_none)
    }

    /// Whether the union can be projected as a leaf type list
    pub fn is_primitive(&self) -> bool {
        if self.options.len() == 1 {
            return true;
        }
        if self.options.len() == 2 && self.is_optional() {
            return true;
        }
        self.options
            .iter()
            .all(|option| matches!(option, None | Some(SchemaNode::Primitive(_))))
    }
}

/// Enumerated constants
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNode {
    pub options: Vec<LiteralValue>,
}

/// One field of an object node
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub schema: SchemaNode,
    pub hint: Option<String>,
    pub required: bool,
}

impl ObjectField {
    pub fn new(name: impl Into<String>, schema: SchemaNode, required: bool) -> Self {
        Self {
            name: name.into(),
            schema,
            hint: None,
            required,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Composite value with a means of construction
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    pub constructor: Constructor,
    /// Fields that must be passed by position, in declaration order
    pub positional_only: Vec<String>,
    pub name: String,
    pub fields: Vec<ObjectField>,
    pub hint: Option<String>,
}

impl ObjectNode {
    pub fn field(&self, name: &str) -> Option<&ObjectField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Copy of the node with a different hint
    pub fn with_hint(&self, hint: Option<String>) -> ObjectNode {
        ObjectNode {
            hint,
            ..self.clone()
        }
    }
}

impl SchemaNode {
    pub fn undefined(original: Annotation) -> Self {
        SchemaNode::Undefined(UndefinedNode { original })
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        SchemaNode::Primitive(PrimitiveNode { kind })
    }

    pub fn sequence(container: Origin, item: SchemaNode) -> Self {
        SchemaNode::Sequence(SequenceNode {
            container,
            item: Box::new(item),
        })
    }

    pub fn tuple(container: Origin, items: Vec<SchemaNode>) -> Self {
        SchemaNode::Tuple(TupleNode { container, items })
    }

    pub fn mapping(container: Origin, key: SchemaNode, value: SchemaNode) -> Self {
        SchemaNode::Mapping(MappingNode {
            container,
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn union(options: Vec<Option<SchemaNode>>) -> Self {
        SchemaNode::Union(UnionNode { options })
    }

    pub fn literal(options: Vec<LiteralValue>) -> Self {
        SchemaNode::Literal(LiteralNode { options })
    }

    /// Short shape name used in error messages
    pub fn shape(&self) -> &'static str {
        match self {
            SchemaNode::Undefined(_) => "undefined",
            SchemaNode::Primitive(_) => "primitive",
            SchemaNode::Sequence(_) => "sequence",
            SchemaNode::Tuple(_) => "tuple",
            SchemaNode::Mapping(_) => "mapping",
            SchemaNode::Union(_) => "union",
            SchemaNode::Literal(_) => "literal",
            SchemaNode::Object(_) => "object",
        }
    }
}

impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Undefined(node) => write!(f, "Undefined({})", node.original),
            SchemaNode::Primitive(node) => write!(f, "{}", node.kind),
            SchemaNode::Sequence(node) => write!(f, "{}[{}]", node.container, node.item),
            SchemaNode::Tuple(node) => {
                write!(f, "{}[", node.container)?;
                for (i, item) in node.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            SchemaNode::Mapping(node) => {
                write!(f, "{}[{}, {}]", node.container, node.key, node.value)
            }
            SchemaNode::Union(node) => write!(f, "{}", node),
            SchemaNode::Literal(node) => {
                f.write_str("Literal[")?;
                for (i, value) in node.options.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            SchemaNode::Object(node) => f.write_str(&node.name),
        }
    }
}

impl fmt::Display for UnionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, option) in self.options.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            match option {
                Some(option) => write!(f, "{}", option)?,
                None => f.write_str("None")?,
            }
        }
        Ok(())
    }
}

/// Complete schema of a function, class or tool
#[derive(Debug, Clone, PartialEq)]
pub struct CallableSchema {
    /// The parameter list as an object
    pub call_schema: ObjectNode,
    pub return_schema: SchemaNode,
    /// Used for tool descriptions, never for return values
    pub long_description: Option<String>,
}

impl CallableSchema {
    pub fn name(&self) -> &str {
        &self.call_schema.name
    }
}
