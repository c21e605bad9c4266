//! `FileKeyStore` — a key store backed by a local JSON document.
//!
//! Layout:
//!
//! ```json
//! { "vaults": { "contoso": [ { "vault_name": "contoso", "key_name": "k1", ... } ] } }
//! ```
//!
//! The document is re-read on every call, so the store never caches.
//! Key order within a vault is the document order.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{KeyVaultError, Result};

use super::{KeyRecord, KeyStoreClient};

/// On-disk document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub vaults: BTreeMap<String, Vec<KeyRecord>>,
}

/// Key store reading from and writing to a JSON file.
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document from disk.
    pub fn load(&self) -> Result<StoreDocument> {
        if !self.path.exists() {
            return Err(KeyVaultError::ConfigError(format!(
                "store file {} does not exist",
                self.path.display()
            )));
        }

        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| {
            KeyVaultError::SerializationError(format!("{}: {e}", self.path.display()))
        })
    }

    /// Write the document back.
    ///
    /// Writes to a temp file in the same directory, then renames it over
    /// the target so readers never see a half-written document.
    pub fn save(&self, doc: &StoreDocument) -> Result<()> {
        let buf = serde_json::to_vec_pretty(doc)
            .map_err(|e| KeyVaultError::SerializationError(format!("store document: {e}")))?;

        let parent = self.path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        fs::write(&tmp_path, &buf)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    fn vault<'a>(doc: &'a StoreDocument, vault: &str) -> Result<&'a Vec<KeyRecord>> {
        doc.vaults
            .get(vault)
            .ok_or_else(|| KeyVaultError::VaultNotFound(vault.to_string()))
    }

    fn not_found(vault: &str, name: &str) -> KeyVaultError {
        KeyVaultError::KeyNotFound {
            vault: vault.to_string(),
            key: name.to_string(),
        }
    }
}

impl KeyStoreClient for FileKeyStore {
    fn get_key(&self, vault: &str, name: &str) -> Result<KeyRecord> {
        let doc = self.load()?;
        Self::vault(&doc, vault)?
            .iter()
            .find(|k| k.key_name == name)
            .cloned()
            .ok_or_else(|| Self::not_found(vault, name))
    }

    fn get_keys(&self, vault: &str) -> Result<Vec<KeyRecord>> {
        let doc = self.load()?;
        Ok(Self::vault(&doc, vault)?.clone())
    }

    fn delete_key(&self, vault: &str, name: &str) -> Result<KeyRecord> {
        let mut doc = self.load()?;
        let keys = doc
            .vaults
            .get_mut(vault)
            .ok_or_else(|| KeyVaultError::VaultNotFound(vault.to_string()))?;

        let index = keys
            .iter()
            .position(|k| k.key_name == name)
            .ok_or_else(|| Self::not_found(vault, name))?;
        let removed = keys.remove(index);

        self.save(&doc)?;
        tracing::debug!(vault, key = name, path = %self.path.display(), "key removed from store file");

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyAttributes;
    use tempfile::TempDir;

    fn seeded(dir: &TempDir) -> FileKeyStore {
        let store = FileKeyStore::new(&dir.path().join("keys.json"));
        let mut doc = StoreDocument::default();
        doc.vaults.insert(
            "contoso".into(),
            vec![
                KeyRecord::new("contoso", "zeta", KeyAttributes::default()),
                KeyRecord::new("contoso", "alpha", KeyAttributes::default()),
            ],
        );
        store.save(&doc).unwrap();
        store
    }

    #[test]
    fn get_keys_preserves_document_order() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let names: Vec<String> = store
            .get_keys("contoso")
            .unwrap()
            .into_iter()
            .map(|k| k.key_name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn delete_returns_record_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let removed = store.delete_key("contoso", "zeta").unwrap();
        assert_eq!(removed.key_name, "zeta");

        let reopened = FileKeyStore::new(store.path());
        assert_eq!(reopened.get_keys("contoso").unwrap().len(), 1);
        assert!(matches!(
            reopened.get_key("contoso", "zeta"),
            Err(KeyVaultError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn unknown_vault_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);
        assert!(matches!(
            store.get_keys("fabrikam"),
            Err(KeyVaultError::VaultNotFound(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyStore::new(&dir.path().join("absent.json"));
        assert!(store.get_keys("contoso").is_err());
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keys.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileKeyStore::new(&path);
        assert!(matches!(
            store.get_keys("contoso"),
            Err(KeyVaultError::SerializationError(_))
        ));
    }
}
