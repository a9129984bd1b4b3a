//! Rendering of command results on stdout
//!
//! JSON and YAML carry nothing but the data so they can be piped into other
//! tools. The human format adds section headers and status lines, and lays
//! out declarations and rejections for reading.

use crate::cli::OutputFormat;
use crate::error::Result;
use callschema_core::{CallableJsonSchema, ValidationError};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};
use tracing::trace;

/// Rendering of results in one output format
pub trait OutputFormatter {
    /// Render any serializable value
    fn render<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Render the feedback for a rejected tool call
    fn render_rejection(&self, error: &ValidationError) -> Result<String>;

    /// Render tool declarations
    fn render_declarations(&self, declarations: &[CallableJsonSchema]) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let rendered = match self {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Human | OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
        };
        Ok(rendered)
    }

    fn render_rejection(&self, error: &ValidationError) -> Result<String> {
        if *self != OutputFormat::Human {
            return self.render(error);
        }
        let mut text = String::new();
        rejection_tree(&mut text, error, 0);
        Ok(text)
    }

    fn render_declarations(&self, declarations: &[CallableJsonSchema]) -> Result<String> {
        if *self != OutputFormat::Human {
            return self.render(&declarations);
        }
        let mut blocks = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            blocks.push(format!(
                "── {} ({}) ──\n{}\n",
                declaration.name(),
                declaration.flavor(),
                serde_json::to_string_pretty(declaration)?
            ));
        }
        Ok(blocks.join("\n"))
    }
}

/// One rejection per line, causes indented under the error they explain
fn rejection_tree(text: &mut String, error: &ValidationError, depth: usize) {
    // Writing to a String cannot fail.
    let _ = if depth == 0 {
        writeln!(text, "Rejected at {}: {}", error.path, error.message)
    } else {
        writeln!(text, "{:width$}- {}: {}", "", error.path, error.message, width = depth * 2)
    };
    for cause in &error.causes {
        rejection_tree(text, cause, depth + 1);
    }
}

/// Kinds of human-only status lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Warning,
    Section,
}

impl Status {
    fn decorate(self, message: &str, color: bool) -> String {
        match (self, color) {
            (Status::Success, true) => message.green().to_string(),
            (Status::Success, false) => message.to_string(),
            (Status::Warning, true) => message.yellow().to_string(),
            (Status::Warning, false) => format!("WARNING: {}", message),
            (Status::Section, true) => format!("\n═══ {} ═══", message).bright_blue().to_string(),
            (Status::Section, false) => format!("\n=== {} ===", message),
        }
    }

    /// Warnings survive `--quiet`
    fn shown_when_quiet(self) -> bool {
        self == Status::Warning
    }
}

/// Writes results to stdout (or any sink) in the selected format
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    sink: Box<dyn Write>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        sink: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            sink,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write text as is
    pub fn write(&mut self, text: &str) -> Result<()> {
        self.sink.write_all(text.as_bytes())?;
        self.sink.flush()?;
        Ok(())
    }

    /// Write text followed by a newline
    pub fn writeln(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.write("\n")
    }

    pub fn success(&mut self, message: &str) -> Result<()> {
        self.status(Status::Success, message)
    }

    pub fn warning(&mut self, message: &str) -> Result<()> {
        self.status(Status::Warning, message)
    }

    pub fn section(&mut self, title: &str) -> Result<()> {
        self.status(Status::Section, title)
    }

    fn status(&mut self, status: Status, message: &str) -> Result<()> {
        if !self.is_human() || (self.quiet && !status.shown_when_quiet()) {
            return Ok(());
        }
        let line = status.decorate(message, self.use_color);
        self.writeln(&line)
    }

    /// Serialized data in the selected format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let rendered = self.format.render(value)?;
        trace!(bytes = rendered.len(), format = ?self.format, "Writing data");
        self.emit(&rendered)
    }

    pub fn declarations(&mut self, declarations: &[CallableJsonSchema]) -> Result<()> {
        let rendered = self.format.render_declarations(declarations)?;
        self.emit(&rendered)
    }

    pub fn validation_error(&mut self, error: &ValidationError) -> Result<()> {
        let rendered = self.format.render_rejection(error)?;
        if self.is_human() && self.use_color {
            return self.write(&rendered.red().to_string());
        }
        self.emit(&rendered)
    }

    /// Write a rendered block, ending it with exactly one newline
    fn emit(&mut self, rendered: &str) -> Result<()> {
        self.write(rendered.trim_end_matches('\n'))?;
        self.write("\n")
    }
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
