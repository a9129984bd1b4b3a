//! Callschema Core - Tool schemas for LLM function calling
//!
//! This crate turns function and class declarations into schemas, renders
//! those schemas as the tool declarations model APIs expect, and evaluates
//! the JSON arguments a model sends back into constructed values.
//!
//! # Main Components
//!
//! - **Declarations**: [`Callable`], [`Annotation`] and the annotation parser
//! - **Normalization**: canonical forms of annotations ([`normalize()`])
//! - **Extraction**: [`SchemaExtractor`] with pluggable [`ExtractionStrategy`]s
//! - **Schema Nodes**: the closed [`SchemaNode`] algebra, its projection and
//!   evaluation
//! - **Tools**: the response tool and the [`Toolbox`] registry
//!
//! # Example
//!
//! ```
//! use callschema_core::{extract_schema, Annotation, Callable, JsonSchemaFlavor, Parameter};
//! use serde_json::json;
//!
//! fn example() -> callschema_core::Result<()> {
//!     let foo = Callable::function("foo")
//!         .doc("Foo the bar.\n\nArgs:\n    x: How much.")
//!         .param(Parameter::new("x", Annotation::Int))
//!         .build()?;
//!     let schema = extract_schema(&foo)?;
//!
//!     let declaration = schema.json_schema(JsonSchemaFlavor::OpenAi, false)?;
//!     assert_eq!(declaration.parameters().required, vec!["x"]);
//!
//!     let value = schema.eval(&json!({"x": 1}))?;
//!     assert_eq!(value.as_record().and_then(|r| r.get("x")).and_then(|x| x.as_i64()), Some(1));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod annotation;
pub mod callable;
pub mod docstring;
pub mod error;
pub mod extract;
pub mod jsonschema;
pub mod native;
pub mod normalize;
pub mod response;
pub mod schema;
pub mod toolbox;

mod prop_tests;
mod proptest_strategies;

// Re-export main types for convenience
pub use annotation::{Annotation, LiteralValue, NameResolver, Origin};
pub use callable::{Callable, CallableBuilder, CallableKind, Initializer, Parameter, ParameterKind, Signature};
pub use error::{Error, Result, ValidationError};
pub use extract::{default_extractor, extract_schema, ExtractionStrategy, SchemaExtractor, SchemaExtractorBuilder};
pub use jsonschema::{CallableJsonSchema, JsonSchema, JsonSchemaFlavor};
pub use native::{CallArgs, Constructor, Native, NativeObject, Record};
pub use normalize::{normalize, unpack_optional};
pub use response::{extract_response_schema, response_schema, RESPONSE_TOOL_NAME};
pub use schema::{CallableSchema, EvalContext, ObjectField, ObjectNode, PrimitiveKind, SchemaNode};
pub use toolbox::{ToolOutcome, Toolbox};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
