//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat};
use crate::config::{Config, FileFormat};
use crate::error::Result;
use crate::output::OutputWriter;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show) => {
            let format = match show.format {
                ConfigFormat::Toml => FileFormat::Toml,
                ConfigFormat::Json => FileFormat::Json,
                ConfigFormat::Yaml => FileFormat::Yaml,
            };
            let rendered = config.render(format)?;
            output.write(&rendered)?;
            if !rendered.ends_with('\n') {
                output.writeln("")?;
            }
            Ok(())
        }
        ConfigAction::Paths => {
            for path in Config::default_config_paths() {
                let marker = if path.exists() { "*" } else { " " };
                output.writeln(&format!("{} {}", marker, path.display()))?;
            }
            Ok(())
        }
    }
}
