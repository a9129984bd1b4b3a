//! Values produced by evaluation
//!
//! Evaluating JSON against a schema yields a [`Native`]: scalars and
//! containers for leaf nodes, and whatever a constructor returns for object
//! nodes. Constructors receive their validated arguments as [`CallArgs`].

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A constructed value
#[derive(Clone)]
pub enum Native {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Native>),
    Tuple(Vec<Native>),
    /// Named bag of fields built by the default record constructor
    Record(Record),
    /// Any other value a constructor chooses to build
    Object(Arc<dyn NativeObject>),
}

/// Application value that can sit inside a [`Native`]
pub trait NativeObject: Any + Send + Sync + fmt::Debug {
    /// Type name used in messages
    fn type_name(&self) -> &str;

    /// JSON rendering of the value
    fn to_json(&self) -> Value;

    fn as_any(&self) -> &dyn Any;
}

impl Native {
    pub fn object<T: NativeObject>(value: T) -> Self {
        Native::Object(Arc::new(value))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Native::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Native::Float(x) => Some(*x),
            Native::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Native::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Native::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Native::None)
    }

    /// Borrow the application value if it has type `T`
    pub fn downcast_ref<T: NativeObject>(&self) -> Option<&T> {
        match self {
            Native::Object(object) => object.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// JSON rendering; tuples become arrays, records become objects
    pub fn to_json(&self) -> Value {
        match self {
            Native::None => Value::Null,
            Native::Bool(b) => Value::Bool(*b),
            Native::Int(i) => Value::Number((*i).into()),
            Native::Float(x) => Number::from_f64(*x).map(Value::Number).unwrap_or(Value::Null),
            Native::Str(s) => Value::String(s.clone()),
            Native::List(items) | Native::Tuple(items) => {
                Value::Array(items.iter().map(Native::to_json).collect())
            }
            Native::Record(record) => record.to_json(),
            Native::Object(object) => object.to_json(),
        }
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::None => write!(f, "None"),
            Native::Bool(b) => write!(f, "Bool({})", b),
            Native::Int(i) => write!(f, "Int({})", i),
            Native::Float(x) => write!(f, "Float({:?})", x),
            Native::Str(s) => write!(f, "Str({:?})", s),
            Native::List(items) => f.debug_tuple("List").field(items).finish(),
            Native::Tuple(items) => f.debug_tuple("Tuple").field(items).finish(),
            Native::Record(record) => fmt::Debug::fmt(record, f),
            Native::Object(object) => fmt::Debug::fmt(object, f),
        }
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Native::None, Native::None) => true,
            (Native::Bool(a), Native::Bool(b)) => a == b,
            (Native::Int(a), Native::Int(b)) => a == b,
            (Native::Float(a), Native::Float(b)) => a == b,
            (Native::Str(a), Native::Str(b)) => a == b,
            (Native::List(a), Native::List(b)) => a == b,
            (Native::Tuple(a), Native::Tuple(b)) => a == b,
            (Native::Record(a), Native::Record(b)) => a == b,
            (Native::Object(a), Native::Object(b)) => Arc::ptr_eq(a, b) || a.to_json() == b.to_json(),
            _ => false,
        }
    }
}

/// Record built from a call's arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: IndexMap<String, Native>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Native> {
        self.fields.get(field)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

/// Validated arguments handed to a constructor
///
/// Positional-only parameters arrive in declaration order; every other
/// supplied parameter arrives by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Native>,
    pub keyword: IndexMap<String, Native>,
}

impl CallArgs {
    /// Keyword argument by name
    pub fn get(&self, name: &str) -> Option<&Native> {
        self.keyword.get(name)
    }

    /// Take a keyword argument out of the call
    pub fn take(&mut self, name: &str) -> Option<Native> {
        self.keyword.shift_remove(name)
    }

    /// Integer keyword argument; absent arguments fall back to `default`
    pub fn int_or(&self, name: &str, default: i64) -> anyhow::Result<i64> {
        match self.keyword.get(name) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| anyhow::anyhow!("argument '{}' is not an integer: {:?}", name, value)),
        }
    }

    /// Integer keyword argument that must be present
    pub fn int(&self, name: &str) -> anyhow::Result<i64> {
        match self.keyword.get(name) {
            None => Err(anyhow::anyhow!("missing argument '{}'", name)),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| anyhow::anyhow!("argument '{}' is not an integer: {:?}", name, value)),
        }
    }
}

type ConstructFn = dyn Fn(CallArgs) -> anyhow::Result<Native> + Send + Sync;

/// Shared handle to the code that builds a value from validated arguments
///
/// Two handles are equal when they share the same closure.
#[derive(Clone)]
pub struct Constructor(Arc<ConstructFn>);

impl Constructor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<Native> + Send + Sync + 'static,
    {
        Constructor(Arc::new(f))
    }

    /// Constructor that builds a [`Record`] named `name`
    ///
    /// Positional values are stored under `positional_names`, in order.
    pub fn record(name: impl Into<String>, positional_names: Vec<String>) -> Self {
        let name = name.into();
        Constructor::new(move |args: CallArgs| {
            let mut fields = IndexMap::new();
            for (field, value) in positional_names.iter().zip(args.positional) {
                fields.insert(field.clone(), value);
            }
            fields.extend(args.keyword);
            Ok(Native::Record(Record {
                name: name.clone(),
                fields,
            }))
        })
    }

    pub fn call(&self, args: CallArgs) -> anyhow::Result<Native> {
        (self.0)(args)
    }
}

impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({:p})", Arc::as_ptr(&self.0))
    }
}
