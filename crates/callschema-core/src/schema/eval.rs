//! Evaluation of untrusted JSON against schema nodes

use super::{
    CallableSchema, LiteralNode, ObjectNode, PrimitiveKind, SchemaNode, TupleNode, UnionNode,
};
use crate::annotation::{LiteralValue, Origin};
use crate::native::{CallArgs, Native};
use crate::{Error, Result, ValidationError};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Position of the value being evaluated, as a JSON path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalContext {
    path: String,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::root()
    }
}

impl EvalContext {
    pub fn root() -> Self {
        Self {
            path: "$".to_string(),
        }
    }

    pub fn child(&self, field: &str) -> Self {
        Self {
            path: format!("{}.{}", self.path, field),
        }
    }

    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::Validation(ValidationError::new(self.path.clone(), message))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn literal_native(value: &LiteralValue) -> Native {
    match value {
        LiteralValue::Bool(b) => Native::Bool(*b),
        LiteralValue::Int(i) => Native::Int(*i),
        LiteralValue::Float(x) => Native::Float(*x),
        LiteralValue::Str(s) => Native::Str(s.clone()),
    }
}

impl SchemaNode {
    /// Validate `value` and construct the native value it describes
    pub fn eval(&self, value: &Value) -> Result<Native> {
        self.eval_in(value, &EvalContext::root())
    }

    pub fn eval_in(&self, value: &Value, ctx: &EvalContext) -> Result<Native> {
        match self {
            SchemaNode::Undefined(node) => Err(Error::unsupported(
                "undefined",
                format!("Cannot evaluate value of undefined type {}", node.original),
            )),
            SchemaNode::Primitive(node) => eval_primitive(node.kind, value, ctx),
            SchemaNode::Sequence(node) => {
                let items = value.as_array().ok_or_else(|| {
                    ctx.invalid(format!("Expected array, got {}", json_kind(value)))
                })?;
                let values = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| node.item.eval_in(item, &ctx.child_index(i)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(match node.container {
                    Origin::Tuple => Native::Tuple(values),
                    _ => Native::List(values),
                })
            }
            SchemaNode::Tuple(node) => node.eval_in(value, ctx),
            SchemaNode::Mapping(node) => Err(Error::unsupported(
                "mapping",
                format!("Cannot evaluate value of mapping type {}", node.container),
            )),
            SchemaNode::Union(node) => node.eval_in(value, ctx),
            SchemaNode::Literal(node) => node.eval_in(value, ctx),
            SchemaNode::Object(node) => node.eval_in(value, ctx),
        }
    }
}

fn eval_primitive(kind: PrimitiveKind, value: &Value, ctx: &EvalContext) -> Result<Native> {
    let native = match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(b)) => Some(Native::Bool(*b)),
        (PrimitiveKind::Str, Value::String(s)) => Some(Native::Str(s.clone())),
        (PrimitiveKind::Int, Value::Number(n)) => n.as_i64().map(Native::Int),
        (PrimitiveKind::Float, Value::Number(n)) => n.as_f64().map(Native::Float),
        _ => None,
    };
    native.ok_or_else(|| ctx.invalid(format!("Expected {}, got {}", kind, value)))
}

impl TupleNode {
    fn eval_in(&self, value: &Value, ctx: &EvalContext) -> Result<Native> {
        let items = value
            .as_array()
            .ok_or_else(|| ctx.invalid(format!("Expected array, got {}", json_kind(value))))?;
        if items.len() != self.items.len() {
            return Err(ctx.invalid(format!(
                "Expected tuple of length {}, got {}",
                self.items.len(),
                items.len()
            )));
        }
        let values = self
            .items
            .iter()
            .zip(items)
            .enumerate()
            .map(|(i, (schema, item))| schema.eval_in(item, &ctx.child_index(i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Native::Tuple(values))
    }
}

impl UnionNode {
    fn eval_in(&self, value: &Value, ctx: &EvalContext) -> Result<Native> {
        if value.is_null() && self.is_optional() {
            return Ok(Native::None);
        }

        let mut causes = Vec::new();
        let mut unsupported = 0usize;
        let mut attempted = 0usize;
        for option in self.options.iter().flatten() {
            attempted += 1;
            match option.eval_in(value, ctx) {
                Ok(native) => return Ok(native),
                Err(Error::Validation(err)) => {
                    debug!(path = %ctx.path(), arm = %option, "union arm rejected value");
                    causes.push(err);
                }
                Err(Error::UnsupportedSchema { .. }) => {
                    debug!(path = %ctx.path(), arm = %option, "union arm cannot evaluate");
                    unsupported += 1;
                }
                Err(other) => return Err(other),
            }
        }

        if attempted > 0 && unsupported == attempted {
            return Err(Error::unsupported(
                "union",
                "No alternative of the union can be evaluated",
            ));
        }
        Err(Error::Validation(ValidationError::with_causes(
            ctx.path(),
            format!("Value {} does not match any of the options: {}", value, self),
            causes,
        )))
    }
}

impl LiteralNode {
    fn eval_in(&self, value: &Value, ctx: &EvalContext) -> Result<Native> {
        self.options
            .iter()
            .find(|option| option.matches(value))
            .map(literal_native)
            .ok_or_else(|| {
                let options = self
                    .options
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                ctx.invalid(format!("Value {} is not one of [{}]", value, options))
            })
    }
}

impl ObjectNode {
    /// Validate the fields and invoke the constructor
    pub fn eval(&self, value: &Value) -> Result<Native> {
        self.eval_in(value, &EvalContext::root())
    }

    pub fn eval_in(&self, value: &Value, ctx: &EvalContext) -> Result<Native> {
        let object = value
            .as_object()
            .ok_or_else(|| ctx.invalid(format!("Expected object, got {}", json_kind(value))))?;

        let mut pending: HashSet<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.as_str())
            .collect();
        let mut supplied: IndexMap<&str, Native> = IndexMap::with_capacity(object.len());

        for (key, item) in object {
            let field = self
                .field(key)
                .ok_or_else(|| ctx.invalid(format!("Unexpected field: {}", key)))?;
            let native = field.schema.eval_in(item, &ctx.child(key))?;
            pending.remove(key.as_str());
            supplied.insert(field.name.as_str(), native);
        }

        if !pending.is_empty() {
            let missing = self
                .fields
                .iter()
                .map(|field| field.name.as_str())
                .filter(|name| pending.contains(name))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ctx.invalid(format!("Missing required fields: {{{}}}", missing)));
        }

        let args = self.call_args(supplied, ctx)?;
        self.constructor
            .call(args)
            .map_err(|source| Error::Construction {
                name: self.name.clone(),
                source,
            })
    }

    /// Arrange evaluated fields into a call, in field order
    fn call_args(&self, mut supplied: IndexMap<&str, Native>, ctx: &EvalContext) -> Result<CallArgs> {
        let mut args = CallArgs::default();
        let mut gap: Option<&str> = None;
        for field in &self.fields {
            let Some(value) = supplied.shift_remove(field.name.as_str()) else {
                if self.positional_only.contains(&field.name) {
                    gap.get_or_insert(field.name.as_str());
                }
                continue;
            };
            if self.positional_only.contains(&field.name) {
                if let Some(missing) = gap {
                    return Err(ctx.invalid(format!(
                        "Field {} is passed by position and requires {} to be supplied",
                        field.name, missing
                    )));
                }
                args.positional.push(value);
            } else {
                args.keyword.insert(field.name.clone(), value);
            }
        }
        Ok(args)
    }
}

impl CallableSchema {
    /// Evaluate call arguments and invoke the underlying callable
    pub fn eval(&self, value: &Value) -> Result<Native> {
        self.call_schema.eval(value)
    }
}
