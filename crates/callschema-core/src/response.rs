//! Synthetic response tool
//!
//! A model returns a structured result by calling a tool whose single
//! argument is the result. The tool is derived from a function's return
//! schema; plain-text results need no tool.

use crate::callable::Callable;
use crate::extract::SchemaExtractor;
use crate::native::{CallArgs, Constructor};
use crate::schema::{CallableSchema, ObjectField, ObjectNode, PrimitiveKind, SchemaNode};
use crate::{Error, Result};
use anyhow::anyhow;

pub const RESPONSE_TOOL_NAME: &str = "submit_response";
pub const RESPONSE_FIELD_NAME: &str = "response";
pub const RESPONSE_TOOL_PROMPT: &str = "Call this function to respond to the user.";

/// Response tool for a return schema, or `None` for `str` results
pub fn response_schema(response: &SchemaNode) -> Option<CallableSchema> {
    if *response == SchemaNode::primitive(PrimitiveKind::Str) {
        return None;
    }

    let reply = Constructor::new(|mut args: CallArgs| {
        args.take(RESPONSE_FIELD_NAME)
            .ok_or_else(|| anyhow!("missing argument '{}'", RESPONSE_FIELD_NAME))
    });
    let call_schema = ObjectNode {
        constructor: reply,
        positional_only: Vec::new(),
        name: RESPONSE_TOOL_NAME.to_string(),
        fields: vec![ObjectField::new(RESPONSE_FIELD_NAME, response.clone(), true)],
        hint: Some(RESPONSE_TOOL_PROMPT.to_string()),
    };
    Some(CallableSchema {
        return_schema: SchemaNode::Object(call_schema.clone()),
        call_schema,
        long_description: None,
    })
}

/// Response tool for `callable`'s declared return type
///
/// Fails when the return type is missing or undefined.
pub fn extract_response_schema(
    extractor: &SchemaExtractor,
    callable: &Callable,
) -> Result<Option<CallableSchema>> {
    let schema = extractor.extract_schema(callable)?;
    if matches!(schema.return_schema, SchemaNode::Undefined(_)) {
        return Err(Error::declaration(
            "Function must have a concrete return type annotation.",
        ));
    }
    Ok(response_schema(&schema.return_schema))
}
