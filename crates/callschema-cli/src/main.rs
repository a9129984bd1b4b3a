//! Callschema CLI - tool declarations and tool-call evaluation
//!
//! This is the entry point of the `callschema` binary: it reads a
//! declaration manifest, prints the JSON schemas a tool-calling API expects,
//! and evaluates the arguments a model supplies.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod manifest;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{CommandTimer, LogSettings, ProcessEnv};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e, cli.use_color()),
    };

    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Logging disabled: {}", e);
    }

    match run(cli, &config, use_color) {
        Ok(()) => process::exit(0),
        Err(e) => fail(&e, use_color),
    }
}

fn fail(error: &error::Error, use_color: bool) -> ! {
    eprintln!("{}", error::format_error(error, use_color));
    if error.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }
    process::exit(error.exit_code());
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let timer = CommandTimer::start(command_name(&cli.command));
    let _entered = timer.span().enter();

    let format = cli.output.unwrap_or(config.output.format);
    let mut output = OutputWriter::new(format, use_color, cli.quiet);

    tracing::info!(
        verbosity = cli.verbosity_level(),
        ?format,
        "Executing command"
    );

    match cli.command {
        Commands::Project(args) => handlers::handle_project(args, config, &mut output),
        Commands::Eval(args) => handlers::handle_eval(args, &mut output),
        Commands::Normalize(args) => handlers::handle_normalize(args, &mut output),
        Commands::Config(args) => handlers::handle_config(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Project(_) => "project",
        Commands::Eval(_) => "eval",
        Commands::Normalize(_) => "normalize",
        Commands::Config(_) => "config",
        Commands::Completions(_) => "completions",
    }
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut settings =
        LogSettings::resolve(cli.verbosity_level(), cli.quiet, &config.logging, &ProcessEnv)?;
    settings.ansi = cli.use_color();
    logging::init_logging(settings)
}
