//! Error types for the callschema core library
//!
//! Errors fall into three families that callers treat very differently:
//! extraction and unsupported-schema errors surface once, when a tool is
//! declared; validation errors surface per call and are the only kind an
//! orchestration layer is expected to recover from by re-prompting the model.
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for callschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// Building a schema from a declaration failed
    #[error("Failed to extract schema for {target}: {message}")]
    Extraction {
        target: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The node shape has no tool-call JSON schema or evaluation mapping
    #[error("Unsupported schema ({shape}): {message}")]
    UnsupportedSchema {
        message: String,
        shape: &'static str,
    },

    /// Supplied JSON does not conform to the schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A constructor rejected validated arguments
    #[error("Constructor for '{name}' failed: {source}")]
    Construction {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A callable or toolbox was declared inconsistently
    #[error("Invalid declaration: {message}")]
    Declaration { message: String },

    /// Annotation text could not be parsed
    #[error("Cannot parse annotation '{input}' at position {position}: {message}")]
    Parse {
        input: String,
        position: usize,
        message: String,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a failure raised while extracting `target`
    pub fn extraction(target: impl Into<String>, source: Error) -> Self {
        Error::Extraction {
            target: target.into(),
            message: source.to_string(),
            source: Some(anyhow::Error::new(source)),
        }
    }

    /// Extraction failure without an underlying cause
    pub fn extraction_msg(target: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Extraction {
            target: target.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn unsupported(shape: &'static str, message: impl Into<String>) -> Self {
        Error::UnsupportedSchema {
            message: message.into(),
            shape,
        }
    }

    pub fn declaration(message: impl Into<String>) -> Self {
        Error::Declaration {
            message: message.into(),
        }
    }

    /// True only for errors a caller can fix by supplying different JSON
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// The validation error, when this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Evaluation failure with the JSON path where it occurred
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct ValidationError {
    /// JSON path where the error occurred
    pub path: String,
    /// Human-readable error message
    pub message: String,
    /// Failures of the individual alternatives, for union mismatches
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<ValidationError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error at '{}': {}", self.path, self.message)?;
        for cause in &self.causes {
            write!(f, "\n  - {}", cause)?;
        }
        Ok(())
    }
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    pub fn with_causes(
        path: impl Into<String>,
        message: impl Into<String>,
        causes: Vec<ValidationError>,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            causes,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
