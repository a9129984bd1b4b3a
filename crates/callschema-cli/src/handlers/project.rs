//! Project command handler

use crate::cli::ProjectArgs;
use crate::config::Config;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::output::OutputWriter;
use callschema_core::{default_extractor, extract_response_schema, JsonSchemaFlavor, Toolbox};
use std::sync::Arc;
use tracing::{debug, info};

/// Handle the project command
pub fn handle_project(args: ProjectArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let flavor = args
        .flavor
        .map(JsonSchemaFlavor::from)
        .unwrap_or(config.projection.flavor);
    let long_description = args.long_description || config.projection.include_long_description;

    let callables = match &args.tool {
        Some(name) => vec![Arc::clone(manifest.callable(name)?)],
        None => manifest.functions().cloned().collect(),
    };
    if callables.is_empty() {
        output.warning("The manifest declares no functions")?;
    }

    let extractor = default_extractor();
    let mut toolbox = Toolbox::new();
    for callable in &callables {
        debug!(tool = callable.name(), "Extracting declaration");
        toolbox.add(extractor.extract_schema(callable)?)?;
    }
    let mut declarations = toolbox.declarations(flavor, long_description)?;

    if args.response {
        for callable in &callables {
            match extract_response_schema(extractor, callable)? {
                Some(response) => declarations.push(response.json_schema(flavor, long_description)?),
                None => output.warning(&format!(
                    "{} returns plain text; no response tool is needed",
                    callable.name()
                ))?,
            }
        }
    }

    info!(count = declarations.len(), %flavor, "Projected declarations");
    output.section("Tool declarations")?;
    output.declarations(&declarations)
}
