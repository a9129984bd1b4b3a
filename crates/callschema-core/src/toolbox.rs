//! Tool registry for a tool-calling conversation
//!
//! A [`Toolbox`] holds the schemas advertised to a model, renders their
//! declarations, and evaluates the calls the model makes. Validation
//! failures come back as [`ToolOutcome::Rejected`] so the caller can relay
//! the message to the model and let it retry.
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

use crate::jsonschema::{CallableJsonSchema, JsonSchemaFlavor};
use crate::native::Native;
use crate::response::RESPONSE_TOOL_NAME;
use crate::schema::CallableSchema;
use crate::{Error, Result, ValidationError};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Result of one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// An ordinary tool ran and produced a value
    Completed(Native),
    /// The response tool was called; the conversation is over
    Final(Native),
    /// The arguments were invalid; the message is feedback for the model
    Rejected(ValidationError),
}

impl ToolOutcome {
    pub fn is_final(&self) -> bool {
        matches!(self, ToolOutcome::Final(_))
    }
}

/// Ordered set of tools with unique names
#[derive(Debug, Clone, Default)]
pub struct Toolbox {
    tools: IndexMap<String, CallableSchema>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; names must be unique
    pub fn add(&mut self, schema: CallableSchema) -> Result<()> {
        let name = schema.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(Error::declaration(format!("duplicate tool '{}'", name)));
        }
        self.tools.insert(name, schema);
        Ok(())
    }

    pub fn with_tool(mut self, schema: CallableSchema) -> Result<Self> {
        self.add(schema)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&CallableSchema> {
        self.tools.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations of every tool, in registration order
    pub fn declarations(
        &self,
        flavor: JsonSchemaFlavor,
        include_long_description: bool,
    ) -> Result<Vec<CallableJsonSchema>> {
        self.tools
            .values()
            .map(|tool| tool.json_schema(flavor, include_long_description))
            .collect()
    }

    /// Evaluate a call made by the model
    ///
    /// Unknown tool names and invalid arguments are rejections; unsupported
    /// schemas and constructor failures are errors.
    pub fn invoke(&self, name: &str, arguments: &Value) -> Result<ToolOutcome> {
        let Some(tool) = self.tools.get(name) else {
            return Ok(ToolOutcome::Rejected(ValidationError::new(
                "$",
                format!("Unknown tool: {}", name),
            )));
        };
        match tool.eval(arguments) {
            Ok(value) if name == RESPONSE_TOOL_NAME => Ok(ToolOutcome::Final(value)),
            Ok(value) => Ok(ToolOutcome::Completed(value)),
            Err(Error::Validation(err)) => {
                debug!(tool = name, error = %err, "tool call rejected");
                Ok(ToolOutcome::Rejected(err))
            }
            Err(other) => Err(other),
        }
    }
}
