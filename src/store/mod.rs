//! Store module — the narrow client seam to the key vault service.
//!
//! This module provides:
//! - `KeyRecord` and `KeyAttributes` (`record`)
//! - The `KeyStoreClient` trait every backend implements
//! - A local JSON-document backend (`file`)
//! - A blocking HTTPS backend, behind the `remote-store` feature (`http`)

pub mod file;
#[cfg(feature = "remote-store")]
pub mod http;
pub mod record;

pub use file::FileKeyStore;
#[cfg(feature = "remote-store")]
pub use http::HttpKeyStore;
pub use record::{KeyAttributes, KeyRecord};

use crate::errors::Result;

/// Read and delete access to keys held in vaults.
///
/// Every call is blocking from the caller's point of view.  Timeouts
/// and retries, if any, belong to the implementation.
pub trait KeyStoreClient {
    /// Fetch a single key by name.
    fn get_key(&self, vault: &str, name: &str) -> Result<KeyRecord>;

    /// List every key in a vault, in the order the store yields them.
    fn get_keys(&self, vault: &str) -> Result<Vec<KeyRecord>>;

    /// Delete a key and return its last known record.
    fn delete_key(&self, vault: &str, name: &str) -> Result<KeyRecord>;
}

impl<T: KeyStoreClient + ?Sized> KeyStoreClient for Box<T> {
    fn get_key(&self, vault: &str, name: &str) -> Result<KeyRecord> {
        (**self).get_key(vault, name)
    }

    fn get_keys(&self, vault: &str) -> Result<Vec<KeyRecord>> {
        (**self).get_keys(vault)
    }

    fn delete_key(&self, vault: &str, name: &str) -> Result<KeyRecord> {
        (**self).delete_key(vault, name)
    }
}
