//! Eval command handler

use crate::cli::EvalArgs;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::output::OutputWriter;
use callschema_core::{default_extractor, ToolOutcome, Toolbox};
use serde_json::Value;
use std::path::Path;

/// Handle the eval command
///
/// A rejected call prints the feedback a model would receive and fails
/// with [`Error::Rejected`].
pub fn handle_eval(args: EvalArgs, output: &mut OutputWriter) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let callable = manifest.callable(&args.tool)?;
    let arguments = read_arguments(&args.args)?;

    let schema = default_extractor().extract_schema(callable)?;
    let toolbox = Toolbox::new().with_tool(schema)?;

    match toolbox.invoke(&args.tool, &arguments)? {
        ToolOutcome::Completed(value) | ToolOutcome::Final(value) => {
            output.success(&format!("{} accepted the call", args.tool))?;
            output.data(&value.to_json())
        }
        ToolOutcome::Rejected(rejection) => {
            output.validation_error(&rejection)?;
            Err(Error::Rejected {
                feedback: rejection.to_string(),
            })
        }
    }
}

/// Inline JSON, or the contents of the file named after `@`
fn read_arguments(text: &str) -> Result<Value> {
    match text.strip_prefix('@') {
        Some(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
        None => Ok(serde_json::from_str(text)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_inline_arguments() {
        assert_eq!(read_arguments(r#"{"x": 1}"#).unwrap(), serde_json::json!({"x": 1}));
        assert!(matches!(read_arguments("{x: 1}"), Err(Error::Json(_))));
    }

    #[test]
    fn test_arguments_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        let reference = format!("@{}", file.path().display());
        assert_eq!(read_arguments(&reference).unwrap(), serde_json::json!([1, 2]));

        assert!(matches!(
            read_arguments("@/nonexistent/args.json"),
            Err(Error::FileNotFound { .. })
        ));
    }
}
