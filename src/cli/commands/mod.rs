//! Command implementations, one module per subcommand.

#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod completions;
pub mod get;
pub mod remove;
