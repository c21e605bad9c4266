//! `keyvault remove` — delete a key from a vault.
//!
//! Prompts unless `--force` is given (batch sessions are confirmed
//! implicitly) and prints the removed key only with `--passthru`.

use crate::cli::{load_settings, open_store, Cli};
use crate::config::Settings;
use crate::controller::{OperationController, Outcome, REMOVE_COMMAND};
use crate::errors::Result;
use crate::host::{ConsoleEmitter, TerminalConfirmer};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, vault: &str, name: &str, force: bool, passthru: bool) -> Result<Outcome> {
    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;

    let confirmer = TerminalConfirmer::detect(cli.non_interactive);
    let emitter = ConsoleEmitter::new(settings.output);
    let mut controller = OperationController::new(store, confirmer, emitter);

    let outcome = controller.remove_key(vault, Some(name), force, passthru);
    controller.emitter_mut().finish();

    record_audit(&settings, vault, name, &outcome);

    Ok(outcome)
}

#[cfg(feature = "audit-log")]
fn record_audit(settings: &Settings, vault: &str, name: &str, outcome: &Outcome) {
    crate::audit::log_audit(
        &settings.audit_dir,
        REMOVE_COMMAND,
        vault,
        Some(name),
        &outcome.label(),
    );
}

#[cfg(not(feature = "audit-log"))]
fn record_audit(_settings: &Settings, vault: &str, name: &str, outcome: &Outcome) {
    tracing::debug!(command = REMOVE_COMMAND, vault, key = name, outcome = %outcome.label(), "audit log disabled");
}
