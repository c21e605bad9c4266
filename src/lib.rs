#[cfg(feature = "audit-log")]
pub mod audit;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod host;
pub mod store;
