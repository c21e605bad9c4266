//! Host capabilities injected into the controller.
//!
//! The controller never prompts or prints on its own: it asks a
//! `Confirmer` before destructive calls and hands every result to an
//! `Emitter`.  The terminal implementations live in `terminal`.

pub mod terminal;

pub use terminal::{ConsoleEmitter, OutputFormat, TerminalConfirmer};

use crate::controller::ErrorInfo;
use crate::errors::Result;
use crate::store::KeyRecord;

/// Decides whether a destructive call may proceed.
pub trait Confirmer {
    /// Ask about `subject`.  Implementations that cannot ask (batch
    /// mode) answer `true`.
    fn confirm(&mut self, subject: &str, message: &str) -> Result<bool>;
}

/// Success and error channels.
pub trait Emitter {
    /// Write one value to the success channel.  `None` is the explicit
    /// null marker.
    fn emit(&mut self, value: Option<&KeyRecord>);

    /// Write one record to the error channel.
    fn emit_error(&mut self, info: &ErrorInfo);
}
