//! Projection of schema nodes into tool-call JSON schemas

use super::{
    CallableSchema, LiteralNode, ObjectField, ObjectNode, PrimitiveKind, SchemaNode, UnionNode,
};
use crate::jsonschema::{
    AnthropicCallableSchema, ArrayJsonSchema, CallableJsonSchema, CompositeType, EnumJsonSchema,
    JsonSchema, JsonSchemaFlavor, LeafJsonSchema, LeafType, LeafTypeName, ObjectJsonSchema,
    OpenAiCallableSchema,
};
use crate::{Error, Result};
use indexmap::IndexMap;

fn leaf_type_name(kind: PrimitiveKind) -> LeafTypeName {
    match kind {
        PrimitiveKind::Int => LeafTypeName::Integer,
        PrimitiveKind::Float => LeafTypeName::Number,
        PrimitiveKind::Str => LeafTypeName::String,
        PrimitiveKind::Bool => LeafTypeName::Boolean,
    }
}

fn hint_of(parent_hint: Option<&str>) -> Option<String> {
    parent_hint.filter(|hint| !hint.is_empty()).map(str::to_string)
}

impl SchemaNode {
    /// Tool-call JSON schema of the node
    ///
    /// `parent_hint` is the description the enclosing field supplies.
    pub fn json_schema(&self, parent_hint: Option<&str>) -> Result<JsonSchema> {
        match self {
            SchemaNode::Undefined(_) => Err(Error::unsupported(
                "undefined",
                "JSON schema cannot be generated for missing or undefined annotations.",
            )),
            SchemaNode::Primitive(node) => Ok(JsonSchema::Leaf(LeafJsonSchema {
                schema_type: LeafType::Single(leaf_type_name(node.kind)),
                description: hint_of(parent_hint),
            })),
            SchemaNode::Sequence(node) => Ok(JsonSchema::Array(ArrayJsonSchema {
                schema_type: CompositeType::Array,
                items: Box::new(node.item.json_schema(None)?),
                description: hint_of(parent_hint),
            })),
            SchemaNode::Tuple(_) => Err(Error::unsupported(
                "tuple",
                "JSON schema cannot be generated for heterogeneous tuple types.",
            )),
            SchemaNode::Mapping(_) => Err(Error::unsupported(
                "mapping",
                "JSON schema cannot be generated for Mapping types.",
            )),
            SchemaNode::Union(node) => node.json_schema(parent_hint),
            SchemaNode::Literal(node) => node.json_schema(parent_hint),
            SchemaNode::Object(node) => Ok(JsonSchema::Object(node.json_schema(parent_hint)?)),
        }
    }
}

impl UnionNode {
    pub fn json_schema(&self, parent_hint: Option<&str>) -> Result<JsonSchema> {
        if !self.is_primitive() {
            return Err(Error::unsupported(
                "union",
                "JSON schema cannot be generated for non-trivial Union types.",
            ));
        }

        let present: Vec<&SchemaNode> = self.options.iter().flatten().collect();
        if self.is_optional() && present.len() == 1 {
            return present[0].json_schema(parent_hint);
        }

        let mut names = Vec::with_capacity(present.len());
        for option in &present {
            match option {
                SchemaNode::Primitive(node) => {
                    let name = leaf_type_name(node.kind);
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                // a single non-primitive arm counts as primitive
                other => return other.json_schema(parent_hint),
            }
        }
        if names.contains(&LeafTypeName::Number) {
            names.retain(|name| *name != LeafTypeName::Integer);
        }

        let schema_type = match names.as_slice() {
            [] => {
                return Err(Error::unsupported(
                    "union",
                    "JSON schema cannot be generated for a Union without alternatives.",
                ))
            }
            [single] => LeafType::Single(*single),
            _ => LeafType::Many(names),
        };
        Ok(JsonSchema::Leaf(LeafJsonSchema {
            schema_type,
            description: hint_of(parent_hint),
        }))
    }
}

impl LiteralNode {
    pub fn json_schema(&self, parent_hint: Option<&str>) -> Result<JsonSchema> {
        let values = self
            .options
            .iter()
            .map(|option| option.as_str().map(str::to_string))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(|| {
                Error::unsupported(
                    "literal",
                    "JSON schema can only be generated for string literal types.",
                )
            })?;
        Ok(JsonSchema::Enum(EnumJsonSchema {
            schema_type: CompositeType::String,
            values,
            description: hint_of(parent_hint),
        }))
    }
}

impl ObjectField {
    pub fn json_schema(&self) -> Result<JsonSchema> {
        self.schema.json_schema(self.hint.as_deref())
    }
}

impl ObjectNode {
    /// Object schema; the description joins the parent hint and the node's
    /// own hint with a blank line, parent first
    pub fn json_schema(&self, parent_hint: Option<&str>) -> Result<ObjectJsonSchema> {
        let mut properties = IndexMap::with_capacity(self.fields.len());
        for field in &self.fields {
            let schema = field.json_schema().map_err(|err| match err {
                Error::UnsupportedSchema { message, shape } => Error::UnsupportedSchema {
                    message: format!("field '{}' of '{}': {}", field.name, self.name, message),
                    shape,
                },
                other => other,
            })?;
            properties.insert(field.name.clone(), schema);
        }
        let required = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.clone())
            .collect();

        let description = [parent_hint, self.hint.as_deref()]
            .into_iter()
            .flatten()
            .filter(|hint| !hint.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(ObjectJsonSchema {
            schema_type: CompositeType::Object,
            properties,
            required,
            description: Some(description).filter(|d| !d.is_empty()),
        })
    }
}

impl CallableSchema {
    /// Tool declaration for the target API
    ///
    /// The call schema's own hint moves to the top-level description, joined
    /// with the long description when `include_long_description` is set.
    pub fn json_schema(
        &self,
        flavor: JsonSchemaFlavor,
        include_long_description: bool,
    ) -> Result<CallableJsonSchema> {
        let mut parts = Vec::new();
        if let Some(hint) = self.call_schema.hint.as_deref().filter(|h| !h.is_empty()) {
            parts.push(hint);
        }
        if include_long_description {
            if let Some(long) = self.long_description.as_deref().filter(|l| !l.is_empty()) {
                parts.push(long);
            }
        }
        let description = Some(parts.join("\n\n")).filter(|d| !d.is_empty());
        let parameters = self.call_schema.with_hint(None).json_schema(None)?;

        Ok(match flavor {
            JsonSchemaFlavor::OpenAi => CallableJsonSchema::OpenAi(OpenAiCallableSchema {
                name: self.name().to_string(),
                description,
                parameters,
            }),
            JsonSchemaFlavor::Anthropic => CallableJsonSchema::Anthropic(AnthropicCallableSchema {
                name: self.name().to_string(),
                description,
                input_schema: parameters,
            }),
        })
    }
}
