//! Terminal host: `dialoguer` prompts and console output.

use std::io::IsTerminal;

use comfy_table::{ContentArrangement, Table};
use dialoguer::Confirm;
use serde::Deserialize;

use crate::cli::output;
use crate::controller::ErrorInfo;
use crate::errors::{KeyVaultError, Result};
use crate::store::KeyRecord;

use super::{Confirmer, Emitter};

/// How records are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table, rendered once the command finishes.
    #[default]
    Table,
    /// One JSON document per record, streamed as emitted.
    Json,
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Confirms through an interactive prompt, or implicitly in batch mode.
pub struct TerminalConfirmer {
    interactive: bool,
}

impl TerminalConfirmer {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Interactive unless batch mode was requested or stdin is not a terminal.
    pub fn detect(non_interactive: bool) -> Self {
        Self::new(!non_interactive && std::io::stdin().is_terminal())
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, subject: &str, message: &str) -> Result<bool> {
        // Batch sessions get an implicit yes and print nothing.
        if !self.interactive {
            tracing::info!(subject, message, "non-interactive session, confirmation implied");
            return Ok(true);
        }

        Confirm::new()
            .with_prompt(format!("{message}?"))
            .default(false)
            .interact()
            .map_err(|e| KeyVaultError::CommandFailed(format!("confirm prompt: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// Writes records to stdout and errors to stderr.
pub struct ConsoleEmitter {
    format: OutputFormat,
    rows: Vec<KeyRecord>,
    emitted: usize,
}

impl ConsoleEmitter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            rows: Vec::new(),
            emitted: 0,
        }
    }

    /// Values written to the success channel so far (null markers included).
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Render any buffered table rows.  JSON output is never buffered.
    pub fn finish(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        println!("{}", render_table(&self.rows));
        self.rows.clear();
    }
}

impl Emitter for ConsoleEmitter {
    fn emit(&mut self, value: Option<&KeyRecord>) {
        self.emitted += 1;

        match (self.format, value) {
            (OutputFormat::Json, Some(record)) => match serde_json::to_string(record) {
                Ok(line) => println!("{line}"),
                Err(e) => output::error(&format!("could not serialize {}: {e}", record.qualified_name())),
            },
            (OutputFormat::Json, None) => println!("null"),
            (OutputFormat::Table, Some(record)) => self.rows.push(record.clone()),
            (OutputFormat::Table, None) => output::info("Nothing removed (not confirmed)."),
        }
    }

    fn emit_error(&mut self, info: &ErrorInfo) {
        match self.format {
            OutputFormat::Json => match serde_json::to_string(info) {
                Ok(line) => eprintln!("{line}"),
                Err(_) => output::error(&info.to_string()),
            },
            OutputFormat::Table => output::error(&info.to_string()),
        }
    }
}

/// Build the key table (Vault, Name, Type, Enabled, Expires, Operations, Thumbprint).
pub fn render_table(records: &[KeyRecord]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Vault",
        "Name",
        "Type",
        "Enabled",
        "Expires",
        "Operations",
        "Thumbprint",
    ]);

    for r in records {
        let a = &r.attributes;
        table.add_row(vec![
            r.vault_name.clone(),
            r.key_name.clone(),
            dash_if_empty(&a.key_type),
            if a.enabled { "yes" } else { "no" }.to_string(),
            a.expires
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            dash_if_empty(&a.key_ops.join(",")),
            r.thumbprint()
                .map_or_else(|| "-".to_string(), |tp| tp[..16].to_string()),
        ]);
    }

    table
}

fn dash_if_empty(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}
