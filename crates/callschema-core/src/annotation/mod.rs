//! Type descriptors attached to parameters and return values
//!
//! An [`Annotation`] is the declared type of a parameter before it has been
//! turned into a schema node. It mirrors the notation people write by hand
//! (`list[int]`, `int | None`, `Literal['a', 'b']`) so that declarations read
//! naturally, and it can be parsed from that notation with [`parse`].
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

mod parser;

pub use parser::{parse, parse_with, NameResolver};

use crate::callable::Callable;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Declared type of a parameter or return value
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Accepts anything; also what an unannotated parameter means
    Any,
    /// The null type
    None,
    Int,
    Float,
    Str,
    Bool,
    /// Named indirection to another annotation
    Alias(Arc<TypeAlias>),
    /// Inner type tagged with metadata that carries no structural meaning
    Annotated {
        inner: Box<Annotation>,
        metadata: Vec<String>,
    },
    /// Enumerated constants
    Literal(Vec<LiteralValue>),
    /// Sum of alternatives; `None` arms mark optionality
    Union(Vec<Annotation>),
    /// Parameterized container, e.g. `list[int]`; bare when `args` is empty
    Generic {
        origin: Origin,
        args: Vec<Annotation>,
    },
    /// The `...` marker of `tuple[T, ...]`
    Ellipsis,
    /// A composite class declaration
    Class(ClassRef),
}

impl Annotation {
    pub fn list(item: Annotation) -> Self {
        Annotation::Generic {
            origin: Origin::List,
            args: vec![item],
        }
    }

    /// Homogeneous tuple `tuple[T, ...]`
    pub fn tuple_of(item: Annotation) -> Self {
        Annotation::Generic {
            origin: Origin::Tuple,
            args: vec![item, Annotation::Ellipsis],
        }
    }

    pub fn tuple(items: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Generic {
            origin: Origin::Tuple,
            args: items.into_iter().collect(),
        }
    }

    pub fn dict(key: Annotation, value: Annotation) -> Self {
        Annotation::Generic {
            origin: Origin::Dict,
            args: vec![key, value],
        }
    }

    pub fn generic(origin: Origin, args: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Generic {
            origin,
            args: args.into_iter().collect(),
        }
    }

    pub fn union(arms: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Union(arms.into_iter().collect())
    }

    /// `T | None`
    pub fn optional(inner: Annotation) -> Self {
        Annotation::Union(vec![inner, Annotation::None])
    }

    pub fn literal<V: Into<LiteralValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Annotation::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn annotated(inner: Annotation, metadata: impl IntoIterator<Item = String>) -> Self {
        Annotation::Annotated {
            inner: Box::new(inner),
            metadata: metadata.into_iter().collect(),
        }
    }

    pub fn alias(name: impl Into<String>, target: Annotation) -> Self {
        Annotation::Alias(Arc::new(TypeAlias {
            name: name.into(),
            target,
        }))
    }

    pub fn class(callable: Arc<Callable>) -> Self {
        Annotation::Class(ClassRef(callable))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Annotation::None)
    }
}

/// A named alias, the `type A = int | float` form
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub target: Annotation,
}

/// Shared reference to a class declaration
///
/// Two references are equal when they point at the same declaration.
#[derive(Clone)]
pub struct ClassRef(pub Arc<Callable>);

impl ClassRef {
    pub fn callable(&self) -> &Arc<Callable> {
        &self.0
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassRef").field(&self.0.name()).finish()
    }
}

/// A scalar constant allowed in `Literal[...]`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl LiteralValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Plain equality against a JSON value; numbers compare by value,
    /// booleans never equal numbers
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match (self, value) {
            (LiteralValue::Bool(a), Value::Bool(b)) => a == b,
            (LiteralValue::Str(a), Value::String(b)) => a == b,
            (LiteralValue::Int(a), Value::Number(n)) => match n.as_i64() {
                Some(b) => *a == b,
                None => n.as_f64() == Some(*a as f64),
            },
            (LiteralValue::Float(a), Value::Number(n)) => n.as_f64() == Some(*a),
            _ => false,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(true) => write!(f, "True"),
            LiteralValue::Bool(false) => write!(f, "False"),
            LiteralValue::Int(i) => write!(f, "{}", i),
            LiteralValue::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{:.1}", x),
            LiteralValue::Float(x) => write!(f, "{}", x),
            LiteralValue::Str(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::Str(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::Str(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        LiteralValue::Int(value.into())
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Float(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

/// Origin of a generic container annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Origin {
    List,
    Tuple,
    Dict,
    Set,
    FrozenSet,
    Bytes,
    AbstractSet,
    MutableSet,
    Mapping,
    MutableMapping,
    MappingView,
    Sequence,
    MutableSequence,
    ValuesView,
    KeysView,
    Iterable,
    Iterator,
    Container,
    Collection,
    Sized,
    Reversible,
    ByteString,
}

impl Origin {
    /// Concrete counterpart of an abstract origin; concrete origins map to
    /// themselves
    pub fn concretize(self) -> Origin {
        match self {
            Origin::AbstractSet | Origin::MutableSet => Origin::Set,
            Origin::Mapping | Origin::MutableMapping | Origin::MappingView => Origin::Dict,
            Origin::Sequence
            | Origin::MutableSequence
            | Origin::ValuesView
            | Origin::KeysView
            | Origin::Iterable
            | Origin::Iterator
            | Origin::Container
            | Origin::Collection
            | Origin::Sized
            | Origin::Reversible => Origin::List,
            Origin::ByteString => Origin::Bytes,
            Origin::List
            | Origin::Tuple
            | Origin::Dict
            | Origin::Set
            | Origin::FrozenSet
            | Origin::Bytes => self,
        }
    }

    pub fn is_abstract(self) -> bool {
        self.concretize() != self
    }

    pub fn name(self) -> &'static str {
        match self {
            Origin::List => "list",
            Origin::Tuple => "tuple",
            Origin::Dict => "dict",
            Origin::Set => "set",
            Origin::FrozenSet => "frozenset",
            Origin::Bytes => "bytes",
            Origin::AbstractSet => "Set",
            Origin::MutableSet => "MutableSet",
            Origin::Mapping => "Mapping",
            Origin::MutableMapping => "MutableMapping",
            Origin::MappingView => "MappingView",
            Origin::Sequence => "Sequence",
            Origin::MutableSequence => "MutableSequence",
            Origin::ValuesView => "ValuesView",
            Origin::KeysView => "KeysView",
            Origin::Iterable => "Iterable",
            Origin::Iterator => "Iterator",
            Origin::Container => "Container",
            Origin::Collection => "Collection",
            Origin::Sized => "Sized",
            Origin::Reversible => "Reversible",
            Origin::ByteString => "ByteString",
        }
    }

    pub const ALL: [Origin; 22] = [
        Origin::List,
        Origin::Tuple,
        Origin::Dict,
        Origin::Set,
        Origin::FrozenSet,
        Origin::Bytes,
        Origin::AbstractSet,
        Origin::MutableSet,
        Origin::Mapping,
        Origin::MutableMapping,
        Origin::MappingView,
        Origin::Sequence,
        Origin::MutableSequence,
        Origin::ValuesView,
        Origin::KeysView,
        Origin::Iterable,
        Origin::Iterator,
        Origin::Container,
        Origin::Collection,
        Origin::Sized,
        Origin::Reversible,
        Origin::ByteString,
    ];
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Annotation], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Any => f.write_str("Any"),
            Annotation::None => f.write_str("None"),
            Annotation::Int => f.write_str("int"),
            Annotation::Float => f.write_str("float"),
            Annotation::Str => f.write_str("str"),
            Annotation::Bool => f.write_str("bool"),
            Annotation::Alias(alias) => f.write_str(&alias.name),
            Annotation::Annotated { inner, metadata } => {
                write!(f, "Annotated[{}", inner)?;
                for tag in metadata {
                    write!(f, ", '{}'", tag)?;
                }
                f.write_str("]")
            }
            Annotation::Literal(values) => {
                f.write_str("Literal[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            Annotation::Union(arms) => write_joined(f, arms, " | "),
            Annotation::Generic { origin, args } => {
                f.write_str(origin.name())?;
                if !args.is_empty() {
                    f.write_str("[")?;
                    write_joined(f, args, ", ")?;
                    f.write_str("]")?;
                }
                Ok(())
            }
            Annotation::Ellipsis => f.write_str("..."),
            Annotation::Class(class) => f.write_str(class.0.name()),
        }
    }
}
