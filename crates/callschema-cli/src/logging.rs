//! Diagnostics on stderr
//!
//! Settings are layered: `-v` flags pick a baseline, the `[logging]` section
//! of the configuration file fills in what the flags left open, and
//! `RUST_LOG` / `CALLSCHEMA_LOG_FORMAT` override both. Every invocation gets
//! an id so that JSON logs of concurrent runs can be told apart.

use crate::config;
use crate::error::{Error, Result};
use std::io::IsTerminal;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{field, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

static INVOCATION_ID: OnceLock<String> = OnceLock::new();

/// Environment variable that selects the log layout
pub const LOG_FORMAT_ENV: &str = "CALLSCHEMA_LOG_FORMAT";

/// Resolved subscriber settings
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `warn` or `callschema_core=trace`
    pub filter: String,
    pub layout: LogFormat,
    pub ansi: bool,
    pub thread_ids: bool,
    /// Emit file and line of each event
    pub locations: bool,
}

/// Line layout of log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!(
                "Unknown log format '{}' (expected compact, full or json)",
                other
            ))),
        }
    }
}

/// Source of environment overrides, so tests need not touch the process env
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl LogSettings {
    /// Baseline for a `-v` count
    pub fn for_verbosity(verbosity: u8) -> Self {
        let (filter, layout, thread_ids, locations) = match verbosity {
            0 => ("warn", LogFormat::Compact, false, false),
            1 => ("info", LogFormat::Compact, false, false),
            2 => ("debug", LogFormat::Compact, false, true),
            _ => ("trace", LogFormat::Full, true, true),
        };
        Self {
            filter: filter.to_string(),
            layout,
            ansi: true,
            thread_ids,
            locations,
        }
    }

    /// Layer flags, configuration file and environment
    ///
    /// A level from the file only applies without `-v`; `--quiet` always wins
    /// and limits output to errors.
    pub fn resolve(
        verbosity: u8,
        quiet: bool,
        file: &config::LoggingConfig,
        env: &dyn EnvSource,
    ) -> Result<Self> {
        let mut settings = Self::for_verbosity(verbosity);

        if verbosity == 0 {
            if let Some(level) = &file.level {
                settings.filter = level.clone();
            }
        }
        if settings.layout == LogFormat::Compact {
            settings.layout = file.format.parse()?;
        }

        if let Some(filter) = env.var("RUST_LOG") {
            settings.filter = filter;
        }
        if let Some(layout) = env.var(LOG_FORMAT_ENV) {
            settings.layout = layout.parse()?;
        }

        if quiet {
            settings.filter = "error".to_string();
        }
        Ok(settings)
    }
}

/// Install the global subscriber
pub fn init_logging(settings: LogSettings) -> Result<()> {
    let filter = EnvFilter::try_new(&settings.filter)
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", settings.filter, e)))?;
    let ansi = settings.ansi && std::io::stderr().is_terminal();

    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(settings.thread_ids)
        .with_file(settings.locations)
        .with_line_number(settings.locations);

    let installed = match settings.layout {
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(fmt.with_ansi(ansi).compact().finish())
        }
        LogFormat::Full => tracing::subscriber::set_global_default(fmt.with_ansi(ansi).finish()),
        LogFormat::Json => {
            tracing::subscriber::set_global_default(fmt.with_ansi(false).json().finish())
        }
    };
    installed.map_err(|e| Error::other(format!("Failed to install log subscriber: {}", e)))?;

    let id = invocation_id();
    tracing::debug!(invocation = %id, ?settings, "Logging ready");
    Ok(())
}

/// Id of this invocation, created on first use
pub fn invocation_id() -> &'static str {
    INVOCATION_ID.get_or_init(new_invocation_id)
}

fn new_invocation_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Span around one subcommand that records its duration when dropped
pub struct CommandTimer {
    command: &'static str,
    started: Instant,
    span: Span,
}

impl CommandTimer {
    pub fn start(command: &'static str) -> Self {
        let span = tracing::info_span!(
            "command",
            command = command,
            invocation = invocation_id(),
            elapsed_ms = field::Empty,
        );
        Self {
            command,
            started: Instant::now(),
            span,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed().as_millis() as u64;
        self.span.record("elapsed_ms", elapsed);
        tracing::debug!(command = self.command, elapsed_ms = elapsed, "Command finished");
    }
}
