//! Argument tree of the `callschema` binary
//!
//! Declared with clap's derive API. Every subcommand that reads declarations
//! takes a manifest file (YAML, JSON or TOML).

use callschema_core::JsonSchemaFlavor;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Callschema CLI - tool declarations and tool-call evaluation for LLMs
///
/// Reads function and record declarations from a manifest, projects them to
/// the JSON schemas that tool-calling APIs expect, and evaluates the
/// arguments a model supplies.
#[derive(Parser, Debug)]
#[command(
    name = "callschema",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print only results, warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file to use instead of the default search paths
    #[arg(short, long, global = true, env = "CALLSCHEMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Never colorize output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print tool declarations for the callables in a manifest
    Project(ProjectArgs),

    /// Evaluate a tool call against a declaration
    Eval(EvalArgs),

    /// Normalize an annotation and show its optional inner type
    Normalize(NormalizeArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Print a shell completion script
    Completions(CompletionsArgs),
}

/// Arguments for the project command
#[derive(Parser, Debug)]
pub struct ProjectArgs {
    /// Path to the declaration manifest (YAML, JSON or TOML)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Project only this function or type
    #[arg(short, long, value_name = "NAME")]
    pub tool: Option<String>,

    /// Envelope layout of the declarations
    #[arg(short, long, value_enum)]
    pub flavor: Option<Flavor>,

    /// Append the long description to each tool description
    #[arg(long)]
    pub long_description: bool,

    /// Also print the response tool for the tool's return type
    #[arg(long, requires = "tool")]
    pub response: bool,
}

/// Arguments for the eval command
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Path to the declaration manifest (YAML, JSON or TOML)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Function or type to call
    #[arg(short, long, value_name = "NAME")]
    pub tool: String,

    /// Call arguments as a JSON object, or @path to read them from a file
    #[arg(short, long, value_name = "JSON")]
    pub args: String,
}

/// Arguments for the normalize command
#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// Annotation text, e.g. "Optional[List[int]]"
    #[arg(value_name = "ANNOTATION")]
    pub annotation: String,

    /// Replace abstract collection types with concrete ones
    #[arg(long)]
    pub concretize: bool,

    /// Manifest whose types and aliases the annotation may name
    #[arg(short, long, value_name = "MANIFEST")]
    pub manifest: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// List the paths searched for a configuration file
    Paths,
}

#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Rendering of the effective configuration
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Formats `config show` can render
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Declaration envelope selectable on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Flavor {
    /// `parameters` envelope
    Openai,
    /// `input_schema` envelope
    Anthropic,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<Flavor> for JsonSchemaFlavor {
    fn from(flavor: Flavor) -> Self {
        match flavor {
            Flavor::Openai => JsonSchemaFlavor::OpenAi,
            Flavor::Anthropic => JsonSchemaFlavor::Anthropic,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
