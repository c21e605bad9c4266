//! `keyvault audit` — display the audit log.
//!
//! Usage:
//!   keyvault audit               # show last 50 entries
//!   keyvault audit --last 20     # show last 20
//!   keyvault audit --since 7d    # entries from last 7 days

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{load_settings, parse_since, Cli};
use crate::errors::Result;

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let settings = load_settings(cli)?;

    let since_dt = since.map(parse_since).transpose()?;

    let Some(audit) = AuditLog::open(&settings.audit_dir) else {
        output::info("No audit log found.");
        output::tip("Removals are recorded once `keyvault remove` has run.");
        return Ok(());
    };

    let entries = audit.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Vault", "Key", "Outcome"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.operation.clone(),
            entry.vault.clone(),
            entry.key_name.as_deref().unwrap_or("-").to_string(),
            colorize_outcome(&entry.outcome),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize outcomes for display.
fn colorize_outcome(outcome: &str) -> String {
    match outcome {
        "removed" => style(outcome).green().to_string(),
        "not-confirmed" => style(outcome).yellow().to_string(),
        o if o.starts_with("failed") => style(outcome).red().to_string(),
        _ => outcome.to_string(),
    }
}
