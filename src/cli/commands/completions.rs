//! `keyvault completions` — print a shell completion script.
//!
//!   keyvault completions bash > ~/.local/share/bash-completion/completions/keyvault
//!   keyvault completions zsh > "${fpath[1]}/_keyvault"

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_script(shell, &mut io::stdout())
}

/// Generate the script for `shell` into `out`.
pub fn write_script<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, out);
    out.flush()?;
    Ok(())
}
