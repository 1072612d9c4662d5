//! Shell completion generation command.

use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use crate::ExitCode;
use std::io;
use tracing::debug;

/// Writes the completion script for `shell` to stdout.
pub fn generate_completions(shell: Shell, cmd: &mut Command) {
    debug!("Generating {shell} completions");
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
}

/// Runs the completions command.
pub fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    generate_completions(shell, cmd);
    Ok(ExitCode::Success)
}
