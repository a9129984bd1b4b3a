//! Failures of the `callschema` binary
//!
//! Every failure maps to a distinct process exit code so scripts can tell a
//! rejected tool call apart from a broken manifest.

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Declaration, extraction or projection failure
    #[error("{0}")]
    Core(#[from] callschema_core::Error),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A file that does not parse in the format its extension names
    #[error("Invalid file format for {}: {}", path.display(), message)]
    InvalidFormat { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Manifest declares something inconsistent
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Requested tool is not declared
    #[error("Tool '{name}' is not declared in the manifest")]
    ToolNotFound { name: String },

    /// The model-facing arguments were rejected
    #[error("Tool call rejected: {feedback}")]
    Rejected { feedback: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Process exit code, stable across releases
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::Manifest(_) => 6,
            Self::ToolNotFound { .. } => 7,
            Self::Rejected { .. } => 8,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Errors caused by how the command was invoked
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. })
    }
}

/// Render an error and its source chain for stderr
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut text = error.to_string();
    if let Error::Core(core) = error {
        let mut source = std::error::Error::source(core);
        while let Some(cause) = source {
            text.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
    }

    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), text)
    } else {
        format!("Error: {}", text)
    }
}
