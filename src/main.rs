use clap::Parser;
use keyvault::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Settings are needed for the log level before any command runs; a
    // broken config file is reported by the command itself.
    let log_level = keyvault::cli::load_settings(&cli)
        .map(|s| s.log_level)
        .unwrap_or_else(|_| "warn".to_string());
    keyvault::cli::init_tracing(cli.verbose, &log_level);

    let result = match cli.command {
        Commands::Get {
            ref vault,
            ref name,
        } => keyvault::cli::commands::get::execute(&cli, vault, name.as_deref())
            .map(|outcome| !outcome.is_failure()),
        Commands::Remove {
            ref vault,
            ref name,
            force,
            passthru,
        } => keyvault::cli::commands::remove::execute(&cli, vault, name, force, passthru)
            .map(|outcome| !outcome.is_failure()),
        Commands::Audit { last, ref since } => run_audit(&cli, last, since.as_deref()),
        Commands::Completions { shell } => {
            keyvault::cli::commands::completions::execute(shell).map(|()| true)
        }
    };

    match result {
        Ok(true) => {}
        // The failure has already been written to the error channel.
        Ok(false) => std::process::exit(1),
        Err(e) => {
            keyvault::cli::output::error(&e.to_string());
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "audit-log")]
fn run_audit(cli: &Cli, last: usize, since: Option<&str>) -> keyvault::errors::Result<bool> {
    keyvault::cli::commands::audit_cmd::execute(cli, last, since).map(|()| true)
}

#[cfg(not(feature = "audit-log"))]
fn run_audit(_cli: &Cli, _last: usize, _since: Option<&str>) -> keyvault::errors::Result<bool> {
    Err(keyvault::errors::KeyVaultError::AuditError(
        "built without the audit-log feature".into(),
    ))
}
