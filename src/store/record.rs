//! `KeyRecord` and `KeyAttributes` — a key as reported by the store.
//!
//! Records are immutable once returned: the controller only forwards
//! or discards them.  The public material is kept as an opaque blob
//! and serialized as base64 in JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A key held in a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Vault that holds the key.
    pub vault_name: String,

    /// Key name within the vault.
    pub key_name: String,

    pub attributes: KeyAttributes,

    /// Serialized public key (JSON Web Key bytes).
    /// Absent in list results.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "base64_encode_opt",
        deserialize_with = "base64_decode_opt"
    )]
    pub public_material: Option<Vec<u8>>,
}

/// Management attributes of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttributes {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    /// Key type tag, e.g. `RSA`, `RSA-HSM`, `EC`.
    #[serde(default)]
    pub key_type: String,

    /// Permitted operations, e.g. `sign`, `wrapKey`.
    #[serde(default)]
    pub key_ops: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for KeyAttributes {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            not_before: None,
            expires: None,
            created: None,
            updated: None,
            key_type: String::new(),
            key_ops: Vec::new(),
        }
    }
}

impl KeyRecord {
    /// Build a record without public material.
    pub fn new(vault_name: &str, key_name: &str, attributes: KeyAttributes) -> Self {
        Self {
            vault_name: vault_name.to_string(),
            key_name: key_name.to_string(),
            attributes,
            public_material: None,
        }
    }

    /// Hex SHA-256 over the public material, if any.
    pub fn thumbprint(&self) -> Option<String> {
        let material = self.public_material.as_deref()?;
        let digest = Sha256::digest(material);
        Some(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// `vault/key`, used as the subject of prompts and audit entries.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.vault_name, self.key_name)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for the optional base64 blob
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

fn base64_encode_opt<S>(
    data: &Option<Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match data {
        Some(bytes) => serializer.serialize_some(&BASE64.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

fn base64_decode_opt<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<u8>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map(|s| BASE64.decode(&s).map_err(serde::de::Error::custom))
        .transpose()
}
