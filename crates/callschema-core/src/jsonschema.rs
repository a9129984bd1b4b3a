//! Tool-call JSON schema documents
//!
//! Typed forms of the documents model APIs accept when a callable is
//! advertised as a tool. Field names and nesting are fixed by the target
//! APIs; `description` keys are omitted entirely when there is nothing to say.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// JSON type name of a leaf schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafTypeName {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

/// One type name or several
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafType {
    Single(LeafTypeName),
    Many(Vec<LeafTypeName>),
}

/// Tag of composite schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeType {
    String,
    Array,
    Object,
}

/// `{"type": <name or names>, "description"?: ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafJsonSchema {
    #[serde(rename = "type")]
    pub schema_type: LeafType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `{"type": "string", "enum": [...], "description"?: ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumJsonSchema {
    #[serde(rename = "type")]
    pub schema_type: CompositeType,
    #[serde(rename = "enum")]
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `{"type": "array", "items": ..., "description"?: ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayJsonSchema {
    #[serde(rename = "type")]
    pub schema_type: CompositeType,
    pub items: Box<JsonSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `{"type": "object", "properties": ..., "required": [...], "description"?: ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectJsonSchema {
    #[serde(rename = "type")]
    pub schema_type: CompositeType,
    pub properties: IndexMap<String, JsonSchema>,
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Any projected schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonSchema {
    Enum(EnumJsonSchema),
    Array(ArrayJsonSchema),
    Object(ObjectJsonSchema),
    Leaf(LeafJsonSchema),
}

impl JsonSchema {
    pub fn description(&self) -> Option<&str> {
        match self {
            JsonSchema::Enum(schema) => schema.description.as_deref(),
            JsonSchema::Array(schema) => schema.description.as_deref(),
            JsonSchema::Object(schema) => schema.description.as_deref(),
            JsonSchema::Leaf(schema) => schema.description.as_deref(),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Envelope layout expected by the target API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JsonSchemaFlavor {
    /// Parameters under `parameters`
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Parameters under `input_schema`
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl fmt::Display for JsonSchemaFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonSchemaFlavor::OpenAi => write!(f, "openai"),
            JsonSchemaFlavor::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for JsonSchemaFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(JsonSchemaFlavor::OpenAi),
            "anthropic" => Ok(JsonSchemaFlavor::Anthropic),
            other => Err(format!("Unknown JSON schema flavor: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiCallableSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: ObjectJsonSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicCallableSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: ObjectJsonSchema,
}

/// Tool declaration in either flavor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallableJsonSchema {
    OpenAi(OpenAiCallableSchema),
    Anthropic(AnthropicCallableSchema),
}

impl CallableJsonSchema {
    pub fn name(&self) -> &str {
        match self {
            CallableJsonSchema::OpenAi(schema) => &schema.name,
            CallableJsonSchema::Anthropic(schema) => &schema.name,
        }
    }

    pub fn flavor(&self) -> JsonSchemaFlavor {
        match self {
            CallableJsonSchema::OpenAi(_) => JsonSchemaFlavor::OpenAi,
            CallableJsonSchema::Anthropic(_) => JsonSchemaFlavor::Anthropic,
        }
    }

    /// The parameter object, whichever key it lives under
    pub fn parameters(&self) -> &ObjectJsonSchema {
        match self {
            CallableJsonSchema::OpenAi(schema) => &schema.parameters,
            CallableJsonSchema::Anthropic(schema) => &schema.input_schema,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
