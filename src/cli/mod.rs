//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;
use crate::errors::{KeyVaultError, Result};
use crate::host::OutputFormat;
use crate::store::{FileKeyStore, KeyStoreClient};

/// keyvault CLI: inspect and remove keys held in a key vault.
#[derive(Parser)]
#[command(
    name = "keyvault",
    about = "Inspect and remove keys held in a key vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault URL template; {vault} is replaced with the vault name
    #[arg(long, global = true, env = "KEYVAULT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Use a local JSON key store file instead of the remote service
    #[arg(long, global = true, env = "KEYVAULT_STORE_FILE")]
    pub store_file: Option<PathBuf>,

    /// Output format (default: table)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Never prompt; confirmations are implied
    #[arg(long, global = true, env = "KEYVAULT_NON_INTERACTIVE")]
    pub non_interactive: bool,

    /// Config file (default: ./.keyvault.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Show a key, or every key in the vault when NAME is omitted
    #[command(visible_alias = "list")]
    Get {
        /// Vault name
        vault: String,
        /// Key name
        name: Option<String>,
    },

    /// Remove a key from a vault
    #[command(visible_alias = "delete")]
    Remove {
        /// Vault name
        vault: String,
        /// Key name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
        /// Print the removed key
        #[arg(long)]
        passthru: bool,
    },

    /// View the audit log of removals
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config` or `./.keyvault.toml`, then apply
/// command-line overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_file(path)?,
        None => Settings::load(&std::env::current_dir()?)?,
    };

    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(store_file) = &cli.store_file {
        settings.store_file = Some(store_file.clone());
    }
    if let Some(output) = cli.output {
        settings.output = output;
    }

    Ok(settings)
}

/// Pick the key store backend the settings ask for.
pub fn open_store(settings: &Settings) -> Result<Box<dyn KeyStoreClient>> {
    if let Some(path) = &settings.store_file {
        tracing::debug!(path = %path.display(), "using file key store");
        return Ok(Box::new(FileKeyStore::new(path)));
    }

    open_remote_store(settings)
}

#[cfg(feature = "remote-store")]
fn open_remote_store(settings: &Settings) -> Result<Box<dyn KeyStoreClient>> {
    tracing::debug!(endpoint = %settings.endpoint, api_version = %settings.api_version, "using remote key store");
    let store = crate::store::HttpKeyStore::new(
        &settings.endpoint,
        &settings.api_version,
        settings.timeout(),
    )?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "remote-store"))]
fn open_remote_store(_settings: &Settings) -> Result<Box<dyn KeyStoreClient>> {
    Err(KeyVaultError::ConfigError(
        "built without remote store support — use --store-file".into(),
    ))
}

/// Install the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins; otherwise `-v` flags raise the configured level.
pub fn init_tracing(verbose: u8, default_level: &str) {
    let level = match verbose {
        0 => default_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse a human-friendly duration string like "7d", "24h", "30m".
pub fn parse_since(input: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    let input = input.trim();

    let (num_str, unit) = if let Some(s) = input.strip_suffix('d') {
        (s, 'd')
    } else if let Some(s) = input.strip_suffix('h') {
        (s, 'h')
    } else if let Some(s) = input.strip_suffix('m') {
        (s, 'm')
    } else {
        return Err(KeyVaultError::Validation(format!(
            "invalid duration '{input}' — use format like 7d, 24h, or 30m"
        )));
    };

    let num: i64 = num_str.parse().map_err(|_| {
        KeyVaultError::Validation(format!(
            "invalid duration '{input}' — number part is not valid"
        ))
    })?;

    let duration = match unit {
        'd' => chrono::Duration::days(num),
        'h' => chrono::Duration::hours(num),
        _ => chrono::Duration::minutes(num),
    };

    Ok(chrono::Utc::now() - duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn get_without_name_parses() {
        let parsed = cli(&["keyvault", "get", "contoso"]);
        match parsed.command {
            Commands::Get { vault, name } => {
                assert_eq!(vault, "contoso");
                assert!(name.is_none());
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn list_alias_maps_to_get() {
        let parsed = cli(&["keyvault", "list", "contoso"]);
        assert!(matches!(parsed.command, Commands::Get { .. }));
    }

    #[test]
    fn remove_flags_parse() {
        let parsed = cli(&["keyvault", "delete", "contoso", "k1", "-f", "--passthru"]);
        match parsed.command {
            Commands::Remove {
                force, passthru, ..
            } => {
                assert!(force);
                assert!(passthru);
            }
            _ => panic!("expected remove"),
        }
    }

    #[test]
    fn remove_requires_name() {
        assert!(Cli::try_parse_from(["keyvault", "remove", "contoso"]).is_err());
    }

    #[test]
    fn overrides_apply_over_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("kv.toml");
        std::fs::write(&config, "output = \"table\"\n").unwrap();

        let parsed = cli(&[
            "keyvault",
            "--config",
            config.to_str().unwrap(),
            "--output",
            "json",
            "--store-file",
            "keys.json",
            "--endpoint",
            "http://localhost/{vault}",
            "get",
            "contoso",
        ]);
        let settings = load_settings(&parsed).unwrap();
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.store_file, Some(PathBuf::from("keys.json")));
        assert_eq!(settings.endpoint, "http://localhost/{vault}");
    }

    #[test]
    fn store_file_selects_file_backend() {
        let settings = Settings {
            store_file: Some(PathBuf::from("/nonexistent/keys.json")),
            ..Settings::default()
        };
        let store = open_store(&settings).unwrap();
        // The file backend reports the missing document on first use.
        assert!(store.get_keys("contoso").is_err());
    }

    #[test]
    fn parse_since_units() {
        let diff = Utc::now() - parse_since("7d").unwrap();
        assert!((diff.num_days() - 7).abs() <= 1);
        let diff = Utc::now() - parse_since("24h").unwrap();
        assert!((diff.num_hours() - 24).abs() <= 1);
        let diff = Utc::now() - parse_since("30m").unwrap();
        assert!((diff.num_minutes() - 30).abs() <= 1);
    }

    #[test]
    fn parse_since_rejects_garbage() {
        assert!(parse_since("abc").is_err());
        assert!(parse_since("xd").is_err());
        assert!(parse_since("").is_err());
    }
}
