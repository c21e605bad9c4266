//! Terminal outcomes and the error-channel record.

use std::fmt;

use serde::Serialize;

use crate::errors::KeyVaultError;
use crate::store::KeyRecord;

/// The single terminal result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Records were written to the success channel, in this order.
    /// A read of an empty vault is `Emitted(vec![])`.
    Emitted(Vec<KeyRecord>),
    /// The removal succeeded but pass-through was not requested.
    Suppressed,
    /// The invocation failed; the error was written to the error channel.
    Failed(ErrorInfo),
    /// Confirmation was declined; nothing was removed.
    NotConfirmed,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Short label for the audit log.
    pub fn label(&self) -> String {
        match self {
            Self::Emitted(_) | Self::Suppressed => "removed".to_string(),
            Self::NotConfirmed => "not-confirmed".to_string(),
            Self::Failed(info) => format!("failed: {}", info.message),
        }
    }
}

/// Coarse error taxonomy surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad input, caught before any store call.
    InvalidArgument,
    /// The store (or the confirmation prompt) failed.
    OperationFailed,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::OperationFailed => f.write_str("operation failed"),
        }
    }
}

/// Structured record delivered on the error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    pub category: ErrorCategory,
    /// Command that failed, e.g. `remove`.
    pub command: String,
    /// `vault/key` or `vault` the command was acting on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ErrorInfo {
    /// Translate an error into the record the host receives.
    pub fn from_error(command: &str, target: Option<String>, err: &KeyVaultError) -> Self {
        let category = if err.is_validation() {
            ErrorCategory::InvalidArgument
        } else {
            ErrorCategory::OperationFailed
        };

        Self {
            message: err.to_string(),
            category,
            command: command.to_string(),
            target,
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} {target}: {} ({})", self.command, self.message, self.category),
            None => write!(f, "{}: {} ({})", self.command, self.message, self.category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_are_operation_failed() {
        let info = ErrorInfo::from_error(
            "remove",
            Some("contoso/k".into()),
            &KeyVaultError::Remote("HTTP 500".into()),
        );
        assert_eq!(info.category, ErrorCategory::OperationFailed);
        assert!(info.message.contains("HTTP 500"));
        assert_eq!(info.to_string(), format!("remove contoso/k: {} (operation failed)", info.message));
    }

    #[test]
    fn validation_errors_are_invalid_argument() {
        let info = ErrorInfo::from_error("get", None, &KeyVaultError::Validation("bad".into()));
        assert_eq!(info.category, ErrorCategory::InvalidArgument);
        assert!(info.target.is_none());
    }

    #[test]
    fn serializes_category_in_snake_case() {
        let info = ErrorInfo::from_error("get", None, &KeyVaultError::Remote("x".into()));
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["category"], "operation_failed");
        assert!(json.get("target").is_none());
    }

    #[test]
    fn audit_labels() {
        assert_eq!(Outcome::Suppressed.label(), "removed");
        assert_eq!(Outcome::NotConfirmed.label(), "not-confirmed");
    }
}
