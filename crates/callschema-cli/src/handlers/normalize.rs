//! Normalize command handler

use crate::cli::{NormalizeArgs, OutputFormat};
use crate::error::Result;
use crate::manifest::{parse_builtin, Manifest};
use crate::output::OutputWriter;
use callschema_core::{normalize, unpack_optional};
use serde::Serialize;

/// What the normalize command reports
#[derive(Debug, Serialize)]
pub struct NormalizeReport {
    pub input: String,
    pub normalized: String,
    /// Inner type when the annotation is optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_of: Option<String>,
}

/// Handle the normalize command
pub fn handle_normalize(args: NormalizeArgs, output: &mut OutputWriter) -> Result<()> {
    let annotation = match &args.manifest {
        Some(path) => Manifest::load(path)?.parse_annotation(&args.annotation)?,
        None => parse_builtin(&args.annotation)?,
    };
    let normalized = normalize(&annotation, args.concretize);
    let report = NormalizeReport {
        input: args.annotation,
        optional_of: unpack_optional(&normalized).map(|inner| inner.to_string()),
        normalized: normalized.to_string(),
    };

    if output.format() != OutputFormat::Human {
        return output.data(&report);
    }
    output.writeln(&report.normalized)?;
    if let Some(inner) = &report.optional_of {
        output.writeln(&format!("optional of: {}", inner))?;
    }
    Ok(())
}
