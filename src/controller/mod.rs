//! Controller module — runs one command invocation end to end.
//!
//! Reads dispatch on `CommandMode`.  Removals go through
//! confirm → execute → emit, and every invocation ends in exactly one
//! `Outcome`.  Errors never escape: they are translated into an
//! `ErrorInfo` and written to the host's error channel once.

pub mod outcome;
pub mod request;

pub use outcome::{ErrorCategory, ErrorInfo, Outcome};
pub use request::{validate_key_name, validate_vault_name, CommandMode, CommandRequest};

use crate::errors::KeyVaultError;
use crate::host::{Confirmer, Emitter};
use crate::store::KeyStoreClient;

/// Command name reported for read failures.
pub const READ_COMMAND: &str = "get";

/// Command name reported for removal failures.
pub const REMOVE_COMMAND: &str = "remove";

/// Orchestrates one invocation at a time against a store and a host.
pub struct OperationController<S, C, E> {
    store: S,
    confirmer: C,
    emitter: E,
}

impl<S, C, E> OperationController<S, C, E>
where
    S: KeyStoreClient,
    C: Confirmer,
    E: Emitter,
{
    pub fn new(store: S, confirmer: C, emitter: E) -> Self {
        Self {
            store,
            confirmer,
            emitter,
        }
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn confirmer(&self) -> &C {
        &self.confirmer
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Resolve raw read inputs and run the read.
    pub fn read(&mut self, vault: &str, key: Option<&str>) -> Outcome {
        match CommandMode::parse(vault, key) {
            Ok(mode) => self.read_mode(&mode),
            Err(e) => {
                let target = match key {
                    Some(k) if !k.is_empty() => format!("{vault}/{k}"),
                    _ => vault.to_string(),
                };
                self.fail(READ_COMMAND, Some(target), &e)
            }
        }
    }

    /// Fetch one key or all keys and emit each record in store order.
    ///
    /// A failure while enumerating aborts the whole read; nothing is
    /// emitted on the success channel in that case.
    pub fn read_mode(&mut self, mode: &CommandMode) -> Outcome {
        let result = match mode {
            CommandMode::ByName { vault, key } => {
                self.store.get_key(vault, key).map(|record| vec![record])
            }
            CommandMode::ByVault { vault } => self.store.get_keys(vault),
        };

        match result {
            Ok(records) => {
                tracing::debug!(subject = %mode.target(), count = records.len(), "read succeeded");
                for record in &records {
                    self.emitter.emit(Some(record));
                }
                Outcome::Emitted(records)
            }
            Err(e) => self.fail(READ_COMMAND, Some(mode.target()), &e),
        }
    }

    // ------------------------------------------------------------------
    // Destructive path
    // ------------------------------------------------------------------

    /// Resolve raw removal inputs and run the removal.
    pub fn remove_key(
        &mut self,
        vault: &str,
        key: Option<&str>,
        force: bool,
        pass_thru: bool,
    ) -> Outcome {
        match CommandRequest::removal(vault, key, force, pass_thru) {
            Ok(request) => self.remove(&request),
            Err(e) => {
                let target = match key {
                    Some(k) if !k.is_empty() => format!("{vault}/{k}"),
                    _ => vault.to_string(),
                };
                self.fail(REMOVE_COMMAND, Some(target), &e)
            }
        }
    }

    /// Confirm, delete, and emit according to `force` and `pass_thru`.
    ///
    /// | outcome       | pass_thru | success channel   | error channel |
    /// |---------------|-----------|-------------------|---------------|
    /// | not confirmed | yes       | one null marker   | —             |
    /// | not confirmed | no        | —                 | —             |
    /// | removed       | yes       | the removed record| —             |
    /// | removed       | no        | —                 | —             |
    /// | failed        | either    | —                 | one record    |
    pub fn remove(&mut self, request: &CommandRequest) -> Outcome {
        let vault = request.vault_name.as_str();
        let Some(key) = request.key_name.as_deref() else {
            let err = KeyVaultError::Validation("a key name is required".into());
            return self.fail(REMOVE_COMMAND, Some(request.target()), &err);
        };

        if request.force {
            tracing::debug!(vault, key, "confirmation skipped (--force)");
        } else {
            let message = format!("Remove key '{key}' from vault '{vault}'");
            match self.confirmer.confirm(key, &message) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(vault, key, "removal not confirmed");
                    // Emitted on every declined invocation, not only the first.
                    if request.pass_thru {
                        self.emitter.emit(None);
                    }
                    return Outcome::NotConfirmed;
                }
                Err(e) => return self.fail(REMOVE_COMMAND, Some(request.target()), &e),
            }
        }

        match self.store.delete_key(vault, key) {
            Ok(record) => {
                tracing::debug!(vault, key, pass_thru = request.pass_thru, "key removed");
                if request.pass_thru {
                    self.emitter.emit(Some(&record));
                    Outcome::Emitted(vec![record])
                } else {
                    Outcome::Suppressed
                }
            }
            Err(e) => self.fail(REMOVE_COMMAND, Some(request.target()), &e),
        }
    }

    /// Translate `err` and write it to the error channel once.
    fn fail(&mut self, command: &str, target: Option<String>, err: &KeyVaultError) -> Outcome {
        let info = ErrorInfo::from_error(command, target, err);
        tracing::warn!(command, subject = ?info.target, category = %info.category, error = %err, "command failed");
        self.emitter.emit_error(&info);
        Outcome::Failed(info)
    }
}
