// Commands module - handles CLI command execution

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;

pub mod collect;
pub mod engines;

pub use collect::{CollectOutcome, handle_collect};
pub use engines::handle_engines;

/// Print the completion script for `shell` to stdout
pub fn handle_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
    Ok(())
}
