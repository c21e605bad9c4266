//! Resolved command inputs: `CommandMode` for reads, `CommandRequest` for removals.

use crate::errors::{KeyVaultError, Result};

/// Longest allowed vault name.
const MAX_VAULT_NAME_LEN: usize = 24;

/// Shortest allowed vault name.
const MIN_VAULT_NAME_LEN: usize = 3;

/// Longest allowed key name.
const MAX_KEY_NAME_LEN: usize = 127;

/// What a read command targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandMode {
    /// One key, looked up by name.
    ByName { vault: String, key: String },
    /// Every key in the vault.
    ByVault { vault: String },
}

impl CommandMode {
    /// Validate the inputs and pick the mode.  An absent or empty key
    /// name selects `ByVault`.
    pub fn parse(vault: &str, key: Option<&str>) -> Result<Self> {
        validate_vault_name(vault)?;

        match key {
            Some(key) if !key.is_empty() => {
                validate_key_name(key)?;
                Ok(Self::ByName {
                    vault: vault.to_string(),
                    key: key.to_string(),
                })
            }
            _ => Ok(Self::ByVault {
                vault: vault.to_string(),
            }),
        }
    }

    /// `vault/key` or `vault`, for error context.
    pub fn target(&self) -> String {
        match self {
            Self::ByName { vault, key } => format!("{vault}/{key}"),
            Self::ByVault { vault } => vault.clone(),
        }
    }
}

/// One removal invocation's inputs.  Built once, never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub vault_name: String,
    pub key_name: Option<String>,
    /// Skip the confirmation prompt.
    pub force: bool,
    /// Echo the removed record back on the success channel.
    pub pass_thru: bool,
}

impl CommandRequest {
    /// Build a removal request.  Unlike reads, the key name is mandatory.
    pub fn removal(vault: &str, key: Option<&str>, force: bool, pass_thru: bool) -> Result<Self> {
        validate_vault_name(vault)?;

        let key = key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| KeyVaultError::Validation("a key name is required".into()))?;
        validate_key_name(key)?;

        Ok(Self {
            vault_name: vault.to_string(),
            key_name: Some(key.to_string()),
            force,
            pass_thru,
        })
    }

    /// `vault/key`, or just the vault when no key was given.
    pub fn target(&self) -> String {
        match &self.key_name {
            Some(key) => format!("{}/{key}", self.vault_name),
            None => self.vault_name.clone(),
        }
    }
}

/// Validate a vault name.
///
/// Allowed: ASCII letters, digits, hyphens; 3 to 24 characters; must
/// start with a letter, end with a letter or digit, and contain no
/// consecutive hyphens.
pub fn validate_vault_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(KeyVaultError::Validation(
            "vault name cannot be empty".into(),
        ));
    }

    if name.len() < MIN_VAULT_NAME_LEN || name.len() > MAX_VAULT_NAME_LEN {
        return Err(KeyVaultError::Validation(format!(
            "vault name '{name}' must be {MIN_VAULT_NAME_LEN}-{MAX_VAULT_NAME_LEN} characters long"
        )));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(KeyVaultError::Validation(format!(
            "vault name '{name}' is invalid — only letters, digits, and hyphens are allowed"
        )));
    }

    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(KeyVaultError::Validation(format!(
            "vault name '{name}' must start with a letter"
        )));
    }

    if name.ends_with('-') || name.contains("--") {
        return Err(KeyVaultError::Validation(format!(
            "vault name '{name}' cannot end with a hyphen or contain consecutive hyphens"
        )));
    }

    Ok(())
}

/// Validate a key name: 1 to 127 ASCII letters, digits, or hyphens.
pub fn validate_key_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(KeyVaultError::Validation("key name cannot be empty".into()));
    }

    if name.len() > MAX_KEY_NAME_LEN {
        return Err(KeyVaultError::Validation(format!(
            "key name cannot exceed {MAX_KEY_NAME_LEN} characters"
        )));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(KeyVaultError::Validation(format!(
            "key name '{name}' is invalid — only letters, digits, and hyphens are allowed"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_key_selects_by_name() {
        let mode = CommandMode::parse("contoso", Some("signing")).unwrap();
        assert_eq!(
            mode,
            CommandMode::ByName {
                vault: "contoso".into(),
                key: "signing".into()
            }
        );
        assert_eq!(mode.target(), "contoso/signing");
    }

    #[test]
    fn parse_without_key_selects_by_vault() {
        let mode = CommandMode::parse("contoso", None).unwrap();
        assert_eq!(
            mode,
            CommandMode::ByVault {
                vault: "contoso".into()
            }
        );
        assert_eq!(CommandMode::parse("contoso", Some("")).unwrap(), mode);
    }

    #[test]
    fn parse_rejects_bad_vault() {
        assert!(CommandMode::parse("", None).unwrap_err().is_validation());
        assert!(CommandMode::parse("contoso_vault", None).is_err());
    }

    #[test]
    fn removal_requires_key() {
        let err = CommandRequest::removal("contoso", None, true, false).unwrap_err();
        assert!(err.is_validation());
        assert!(CommandRequest::removal("contoso", Some(""), true, false).is_err());
    }

    #[test]
    fn removal_keeps_flags() {
        let req = CommandRequest::removal("contoso", Some("signing"), false, true).unwrap();
        assert_eq!(req.key_name.as_deref(), Some("signing"));
        assert!(!req.force);
        assert!(req.pass_thru);
        assert_eq!(req.target(), "contoso/signing");
    }

    #[test]
    fn valid_vault_names() {
        assert!(validate_vault_name("contoso").is_ok());
        assert!(validate_vault_name("kv-prod-01").is_ok());
        assert!(validate_vault_name("Abc").is_ok());
    }

    #[test]
    fn rejects_vault_name_length() {
        assert!(validate_vault_name("ab").is_err());
        assert!(validate_vault_name(&"a".repeat(25)).is_err());
    }

    #[test]
    fn rejects_vault_name_shape() {
        assert!(validate_vault_name("1vault").is_err());
        assert!(validate_vault_name("vault-").is_err());
        assert!(validate_vault_name("va--ult").is_err());
        assert!(validate_vault_name("vault.one").is_err());
    }

    #[test]
    fn key_name_rules() {
        assert!(validate_key_name("signing-key-2").is_ok());
        assert!(validate_key_name("k").is_ok());
        assert!(validate_key_name("").is_err());
        assert!(validate_key_name("bad_key").is_err());
        assert!(validate_key_name(&"k".repeat(128)).is_err());
    }
}
