//! Configuration management for the CLI
//!
//! Configuration comes from, in increasing precedence:
//! - Default values
//! - A configuration file (TOML, YAML or JSON, chosen by extension)
//! - Environment variables (logging only)
//! - Command-line arguments

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use callschema_core::JsonSchemaFlavor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FILE_STEM: &str = "callschema";
const EXTENSIONS: [&str; 3] = ["toml", "yaml", "json"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Declaration projection settings
    pub projection: ProjectionConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Envelope used when `--flavor` is not given
    pub flavor: JsonSchemaFlavor,

    /// Append long descriptions to tool descriptions
    pub include_long_description: bool,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Use colored output when the terminal supports it
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: "compact".to_string(),
        }
    }
}

/// On-disk encodings a config or manifest file may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// Pick the format from the file extension; unknown extensions read as JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            _ => FileFormat::Json,
        }
    }

    /// Deserialize `content`, reporting failures against `path`
    pub fn parse<T: serde::de::DeserializeOwned>(self, path: &Path, content: &str) -> Result<T> {
        let invalid = |message: String| Error::InvalidFormat {
            path: path.to_path_buf(),
            message,
        };
        match self {
            FileFormat::Toml => toml::from_str(content).map_err(|e| invalid(e.to_string())),
            FileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| invalid(e.to_string())),
            FileFormat::Json => serde_json::from_str(content).map_err(|e| invalid(e.to_string())),
        }
    }
}

/// Read and deserialize a TOML, YAML or JSON file
pub fn read_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    FileFormat::from_path(path).parse(path, &content)
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        read_file(path).map_err(|e| match e {
            Error::InvalidFormat { path, message } => {
                Error::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration");
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Default configuration file paths, in search order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = EXTENSIONS
            .iter()
            .map(|ext| PathBuf::from(format!(".{}.{}", FILE_STEM, ext)))
            .collect();

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join(FILE_STEM);
            paths.extend(EXTENSIONS.iter().map(|ext| dir.join(format!("config.{}", ext))));
        }

        paths
    }

    /// Render the configuration in the given file format
    pub fn render(&self, format: FileFormat) -> Result<String> {
        match format {
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to render TOML: {}", e))),
            FileFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            FileFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.projection.flavor, JsonSchemaFlavor::OpenAi);
        assert!(!config.projection.include_long_description);
        assert_eq!(config.output.format, OutputFormat::Human);
        assert!(config.output.color);
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[projection]\nflavor = \"anthropic\"\n\n[output]\nformat = \"json-pretty\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.projection.flavor, JsonSchemaFlavor::Anthropic);
        assert_eq!(config.output.format, OutputFormat::JsonPretty);
        assert!(config.output.color);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_yaml_and_json_configs() {
        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(yaml, "projection:\n  include_long_description: true").unwrap();
        assert!(
            Config::from_file(yaml.path())
                .unwrap()
                .projection
                .include_long_description
        );

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(json, "{{\"logging\": {{\"level\": \"debug\"}}}}").unwrap();
        assert_eq!(
            Config::from_file(json.path()).unwrap().logging.level.as_deref(),
            Some("debug")
        );
    }

    #[test]
    fn test_invalid_config_is_a_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[projection]\nflavor = \"cohere\"").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{}", err);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load_with_file(Some(Path::new("/nonexistent/callschema.toml"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_default_paths_start_in_working_directory() {
        let paths = Config::default_config_paths();
        assert_eq!(paths[0], PathBuf::from(".callschema.toml"));
        assert_eq!(paths[2], PathBuf::from(".callschema.json"));
    }

    #[test]
    fn test_render_round_trips_through_toml() {
        let mut config = Config::default();
        config.projection.flavor = JsonSchemaFlavor::Anthropic;
        let rendered = config.render(FileFormat::Toml).unwrap();
        assert!(rendered.contains("flavor = \"anthropic\""));
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
