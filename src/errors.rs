use thiserror::Error;

/// All errors that can occur in keyvault.
#[derive(Debug, Error)]
pub enum KeyVaultError {
    // --- Input errors ---
    #[error("Invalid argument: {0}")]
    Validation(String),

    // --- Store errors ---
    #[error("Vault '{0}' not found")]
    VaultNotFound(String),

    #[error("Key '{key}' not found in vault '{vault}'")]
    KeyNotFound { vault: String, key: String },

    #[error("Key store request failed: {0}")]
    Remote(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

impl KeyVaultError {
    /// True for errors raised before any store call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience type alias for keyvault results.
pub type Result<T> = std::result::Result<T, KeyVaultError>;
