use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;
use clap::CommandFactory;
use std::io;

pub fn handle_completions(args: CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    let bin = command.get_name().to_string();
    tracing::debug!(shell = ?args.shell, "Generating completion script");
    clap_complete::generate(args.shell.to_clap_shell(), &mut command, bin, &mut io::stdout());
    Ok(())
}
