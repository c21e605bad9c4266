//! `keyvault get` — show one key, or every key in a vault.

use crate::cli::{load_settings, open_store, Cli};
use crate::controller::{OperationController, Outcome};
use crate::errors::Result;
use crate::host::{ConsoleEmitter, TerminalConfirmer};

/// Execute the `get` command.
pub fn execute(cli: &Cli, vault: &str, name: Option<&str>) -> Result<Outcome> {
    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;

    // Reads never prompt; the confirmer is only there to satisfy the controller.
    let confirmer = TerminalConfirmer::new(false);
    let emitter = ConsoleEmitter::new(settings.output);
    let mut controller = OperationController::new(store, confirmer, emitter);

    let outcome = controller.read(vault, name);
    // An empty vault emits nothing, so stdout stays empty in both formats.
    controller.emitter_mut().finish();

    Ok(outcome)
}
