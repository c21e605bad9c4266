use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{KeyVaultError, Result};
use crate::host::OutputFormat;

/// Tool configuration, loaded from `.keyvault.toml`.
///
/// Every field has a sensible default so keyvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Vault URL template; `{vault}` is replaced with the vault name.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Service API version sent with every request.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default output format (`table` or `json`).
    #[serde(default)]
    pub output: OutputFormat,

    /// Use a local JSON store file instead of the remote service.
    #[serde(default)]
    pub store_file: Option<PathBuf>,

    /// Diagnostic log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory holding the audit database.
    #[serde(default = "default_audit_dir")]
    pub audit_dir: PathBuf,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_endpoint() -> String {
    "https://{vault}.vault.azure.net".to_string()
}

fn default_api_version() -> String {
    "7.4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from(".keyvault")
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            output: OutputFormat::default(),
            store_file: None,
            log_level: default_log_level(),
            audit_dir: default_audit_dir(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = ".keyvault.toml";

    /// Load settings from `<dir>/.keyvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_file(&config_path)
    }

    /// Load settings from an explicit path, which must exist.
    pub fn load_file(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            KeyVaultError::ConfigError(format!("Failed to read {}: {e}", config_path.display()))
        })?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            KeyVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.timeout_secs == 0 {
            return Err(KeyVaultError::ConfigError(
                "timeout_secs must be greater than zero".into(),
            ));
        }

        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.endpoint, "https://{vault}.vault.azure.net");
        assert_eq!(s.api_version, "7.4");
        assert_eq!(s.timeout(), Duration::from_secs(30));
        assert_eq!(s.output, OutputFormat::Table);
        assert!(s.store_file.is_none());
        assert_eq!(s.audit_dir, PathBuf::from(".keyvault"));
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.api_version, "7.4");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
endpoint = "https://{vault}.vault.usgovcloudapi.net"
api_version = "7.5"
timeout_secs = 10
output = "json"
store_file = "keys.json"
log_level = "debug"
audit_dir = "audit"
"#;
        fs::write(tmp.path().join(".keyvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.endpoint, "https://{vault}.vault.usgovcloudapi.net");
        assert_eq!(settings.api_version, "7.5");
        assert_eq!(settings.timeout_secs, 10);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.store_file, Some(PathBuf::from("keys.json")));
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.audit_dir, PathBuf::from("audit"));
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".keyvault.toml"), "timeout_secs = 5\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.timeout_secs, 5);
        // Rest should be defaults
        assert_eq!(settings.api_version, "7.4");
        assert_eq!(settings.output, OutputFormat::Table);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".keyvault.toml"), "not valid {{toml").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn load_rejects_zero_timeout() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".keyvault.toml"), "timeout_secs = 0\n").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn load_file_requires_existing_path() {
        let tmp = TempDir::new().unwrap();
        assert!(Settings::load_file(&tmp.path().join("missing.toml")).is_err());
    }
}
