//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module under `handlers/`.

mod completions;
mod config;
mod eval;
mod normalize;
mod project;

pub use completions::handle_completions;
pub use config::handle_config;
pub use eval::handle_eval;
pub use normalize::handle_normalize;
pub use project::handle_project;
