//! `HttpKeyStore` — blocking client for a Key Vault style REST API.
//!
//! Behind the `remote-store` feature.  Endpoints, relative to the vault
//! base URL built from the configured template:
//!
//! - `GET    /keys/{name}?api-version=V`
//! - `GET    /keys?api-version=V` (paged through `nextLink`)
//! - `DELETE /keys/{name}?api-version=V`
//!
//! Token acquisition is out of scope: if `KEYVAULT_ACCESS_TOKEN` is set
//! it is sent as a bearer token, otherwise requests go out unauthenticated.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ureq::http::{Response, Uri};
use ureq::typestate::WithoutBody;
use ureq::{Agent, Body, RequestBuilder};
use zeroize::Zeroizing;

use crate::errors::{KeyVaultError, Result};

use super::{KeyAttributes, KeyRecord, KeyStoreClient};

/// Environment variable holding a pre-acquired bearer token.
pub const TOKEN_ENV: &str = "KEYVAULT_ACCESS_TOKEN";

/// Placeholder substituted with the vault name in the endpoint template.
const VAULT_PLACEHOLDER: &str = "{vault}";

/// Key store talking to the vault service over HTTPS.
pub struct HttpKeyStore {
    agent: Agent,
    endpoint: String,
    api_version: String,
    token: Option<Zeroizing<String>>,
}

impl HttpKeyStore {
    /// Build a client for `endpoint`, which must contain `{vault}`.
    pub fn new(endpoint: &str, api_version: &str, timeout: Duration) -> Result<Self> {
        if !endpoint.contains(VAULT_PLACEHOLDER) {
            return Err(KeyVaultError::ConfigError(format!(
                "endpoint '{endpoint}' must contain the {VAULT_PLACEHOLDER} placeholder"
            )));
        }

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .map(Zeroizing::new);

        Ok(Self {
            agent,
            endpoint: endpoint.to_string(),
            api_version: api_version.to_string(),
            token,
        })
    }

    /// Base URL of one vault, e.g. `https://contoso.vault.azure.net`.
    pub fn vault_url(&self, vault: &str) -> String {
        self.endpoint
            .replace(VAULT_PLACEHOLDER, vault)
            .trim_end_matches('/')
            .to_string()
    }

    fn keys_url(&self, vault: &str) -> String {
        format!("{}/keys", self.vault_url(vault))
    }

    fn key_url(&self, vault: &str, name: &str) -> String {
        format!("{}/keys/{name}", self.vault_url(vault))
    }

    /// Attach auth, send, and turn non-2xx statuses into `Remote` errors.
    fn send(&self, request: RequestBuilder<WithoutBody>, what: &str) -> Result<Response<Body>> {
        let request = match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token.as_str())),
            None => request,
        };

        let mut response = request
            .call()
            .map_err(|e| KeyVaultError::Remote(format!("{what}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .body_mut()
            .read_json::<ServiceErrorBody>()
            .ok()
            .map(|body| body.error.describe());

        tracing::warn!(%status, what, "key store returned an error status");
        Err(KeyVaultError::Remote(match detail {
            Some(detail) => format!("{what}: {detail} (HTTP {})", status.as_u16()),
            None => format!("{what}: HTTP {}", status.as_u16()),
        }))
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        mut response: Response<Body>,
        what: &str,
    ) -> Result<T> {
        response
            .body_mut()
            .read_json::<T>()
            .map_err(|e| KeyVaultError::SerializationError(format!("{what}: {e}")))
    }
}

impl KeyStoreClient for HttpKeyStore {
    fn get_key(&self, vault: &str, name: &str) -> Result<KeyRecord> {
        let what = format!("get key '{name}'");
        let request = self
            .agent
            .get(&self.key_url(vault, name))
            .query("api-version", &self.api_version);
        let bundle: KeyBundle = Self::read_json(self.send(request, &what)?, &what)?;
        bundle.into_record(vault, name)
    }

    fn get_keys(&self, vault: &str) -> Result<Vec<KeyRecord>> {
        let what = format!("list keys in '{vault}'");
        let mut records = Vec::new();

        let first = self
            .agent
            .get(&self.keys_url(vault))
            .query("api-version", &self.api_version);
        let mut page: KeyListPage = Self::read_json(self.send(first, &what)?, &what)?;

        // The bearer token only goes back to the vault's own origin.
        let vault_origin = origin(&self.vault_url(vault));
        let mut visited = HashSet::new();

        loop {
            for item in page.value {
                records.push(item.into_record(vault)?);
            }

            // `nextLink` already carries the api-version query.
            let Some(link) = page.next_link.filter(|link| !link.is_empty()) else {
                break;
            };
            if vault_origin.is_none() || origin(&link) != vault_origin {
                return Err(KeyVaultError::Remote(format!(
                    "{what}: refusing to follow nextLink '{link}' outside the vault"
                )));
            }
            if !visited.insert(link.clone()) {
                return Err(KeyVaultError::Remote(format!(
                    "{what}: nextLink '{link}' repeats an earlier page"
                )));
            }

            tracing::debug!(vault, %link, "following next page");
            let request = self.agent.get(&link);
            page = Self::read_json(self.send(request, &what)?, &what)?;
        }

        Ok(records)
    }

    fn delete_key(&self, vault: &str, name: &str) -> Result<KeyRecord> {
        let what = format!("delete key '{name}'");
        let request = self
            .agent
            .delete(&self.key_url(vault, name))
            .query("api-version", &self.api_version);
        let bundle: KeyBundle = Self::read_json(self.send(request, &what)?, &what)?;
        bundle.into_record(vault, name)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// JSON Web Key as returned by the service.  Kept whole as the public material.
#[derive(Debug, Serialize, Deserialize)]
struct JsonWebKey {
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    kty: String,
    #[serde(default)]
    key_ops: Vec<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct WireAttributes {
    enabled: Option<bool>,
    nbf: Option<i64>,
    exp: Option<i64>,
    created: Option<i64>,
    updated: Option<i64>,
}

/// Response of get and delete (the deleted bundle carries extra fields we ignore).
#[derive(Debug, Deserialize)]
struct KeyBundle {
    key: JsonWebKey,
    #[serde(default)]
    attributes: WireAttributes,
}

/// One entry of a list page.  Lists carry no key material.
#[derive(Debug, Deserialize)]
struct KeyItem {
    kid: String,
    #[serde(default)]
    attributes: WireAttributes,
}

#[derive(Debug, Deserialize)]
struct KeyListPage {
    #[serde(default)]
    value: Vec<KeyItem>,
    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: ServiceError,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl ServiceError {
    fn describe(&self) -> String {
        match (self.code.is_empty(), self.message.is_empty()) {
            (false, false) => format!("{}: {}", self.code, self.message),
            (false, true) => self.code.clone(),
            _ => self.message.clone(),
        }
    }
}

fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

impl WireAttributes {
    fn into_attributes(self, key_type: String, key_ops: Vec<String>) -> KeyAttributes {
        KeyAttributes {
            enabled: self.enabled.unwrap_or(true),
            not_before: timestamp(self.nbf),
            expires: timestamp(self.exp),
            created: timestamp(self.created),
            updated: timestamp(self.updated),
            key_type,
            key_ops,
        }
    }
}

impl KeyBundle {
    fn into_record(self, vault: &str, requested: &str) -> Result<KeyRecord> {
        let key_name = self
            .key
            .kid
            .as_deref()
            .and_then(key_name_from_kid)
            .unwrap_or(requested)
            .to_string();

        let public_material = serde_json::to_vec(&self.key)
            .map_err(|e| KeyVaultError::SerializationError(format!("key material: {e}")))?;

        let attributes = self
            .attributes
            .into_attributes(self.key.kty, self.key.key_ops);

        Ok(KeyRecord {
            vault_name: vault.to_string(),
            key_name,
            attributes,
            public_material: Some(public_material),
        })
    }
}

impl KeyItem {
    fn into_record(self, vault: &str) -> Result<KeyRecord> {
        let key_name = key_name_from_kid(&self.kid).ok_or_else(|| {
            KeyVaultError::SerializationError(format!("unrecognized key identifier '{}'", self.kid))
        })?;
        Ok(KeyRecord::new(
            vault,
            key_name,
            self.attributes.into_attributes(String::new(), Vec::new()),
        ))
    }
}

/// Scheme, host and port of `url`, with the scheme's default port filled in.
fn origin(url: &str) -> Option<(String, String, u16)> {
    let uri: Uri = url.parse().ok()?;
    let scheme = uri.scheme_str()?.to_ascii_lowercase();
    let host = uri.host()?.to_ascii_lowercase();
    let port = match (uri.port_u16(), scheme.as_str()) {
        (Some(port), _) => port,
        (None, "https") => 443,
        (None, "http") => 80,
        _ => return None,
    };
    Some((scheme, host, port))
}

/// Extract the key name from an identifier like
/// `https://contoso.vault.azure.net/keys/signing/0123abcd`.
fn key_name_from_kid(kid: &str) -> Option<&str> {
    let mut segments = kid.split('/');
    segments.by_ref().find(|s| *s == "keys")?;
    segments.next().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpKeyStore {
        HttpKeyStore::new(
            "https://{vault}.vault.azure.net/",
            "7.4",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_requires_placeholder() {
        let result = HttpKeyStore::new("https://vault.example", "7.4", Duration::from_secs(5));
        assert!(matches!(result, Err(KeyVaultError::ConfigError(_))));
    }

    #[test]
    fn urls_substitute_vault_name() {
        let s = store();
        assert_eq!(s.vault_url("contoso"), "https://contoso.vault.azure.net");
        assert_eq!(
            s.key_url("contoso", "signing"),
            "https://contoso.vault.azure.net/keys/signing"
        );
        assert_eq!(s.keys_url("contoso"), "https://contoso.vault.azure.net/keys");
    }

    #[test]
    fn key_name_parsed_from_kid() {
        assert_eq!(
            key_name_from_kid("https://contoso.vault.azure.net/keys/signing/0123abcd"),
            Some("signing")
        );
        assert_eq!(
            key_name_from_kid("https://contoso.vault.azure.net/keys/signing"),
            Some("signing")
        );
        assert_eq!(key_name_from_kid("https://contoso.vault.azure.net/keys/"), None);
        assert_eq!(key_name_from_kid("https://contoso.vault.azure.net/secrets/x"), None);
    }

    #[test]
    fn bundle_maps_to_record() {
        let json = r#"{
            "key": {
                "kid": "https://contoso.vault.azure.net/keys/signing/abc",
                "kty": "RSA-HSM",
                "key_ops": ["sign", "verify"],
                "n": "0vx7",
                "e": "AQAB"
            },
            "attributes": { "enabled": false, "exp": 1700000000, "created": 1600000000 },
            "recoveryId": "https://contoso.vault.azure.net/deletedkeys/signing"
        }"#;
        let bundle: KeyBundle = serde_json::from_str(json).unwrap();
        let record = bundle.into_record("contoso", "requested").unwrap();

        assert_eq!(record.vault_name, "contoso");
        assert_eq!(record.key_name, "signing");
        assert!(!record.attributes.enabled);
        assert_eq!(record.attributes.key_type, "RSA-HSM");
        assert_eq!(record.attributes.key_ops, vec!["sign", "verify"]);
        assert_eq!(
            record.attributes.expires.unwrap().timestamp(),
            1_700_000_000
        );
        assert!(record.attributes.not_before.is_none());

        let material: serde_json::Value =
            serde_json::from_slice(record.public_material.as_deref().unwrap()).unwrap();
        assert_eq!(material["n"], "0vx7");
        assert_eq!(material["kty"], "RSA-HSM");
    }

    #[test]
    fn list_page_maps_in_order() {
        let json = r#"{
            "value": [
                { "kid": "https://contoso.vault.azure.net/keys/b", "attributes": {} },
                { "kid": "https://contoso.vault.azure.net/keys/a", "attributes": { "enabled": true } }
            ],
            "nextLink": null
        }"#;
        let page: KeyListPage = serde_json::from_str(json).unwrap();
        assert!(page.next_link.is_none());

        let names: Vec<String> = page
            .value
            .into_iter()
            .map(|item| item.into_record("contoso").unwrap().key_name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn list_item_without_key_segment_is_rejected() {
        let item = KeyItem {
            kid: "https://contoso.vault.azure.net/other/a".into(),
            attributes: WireAttributes::default(),
        };
        assert!(item.into_record("contoso").is_err());
    }

    #[test]
    fn origin_normalizes_default_ports() {
        assert_eq!(
            origin("https://contoso.vault.azure.net:443/keys?$skiptoken=x"),
            origin("https://Contoso.vault.azure.net")
        );
        assert_ne!(
            origin("https://contoso.vault.azure.net/keys"),
            origin("https://elsewhere.example/keys")
        );
        assert_ne!(
            origin("http://contoso.vault.azure.net/keys"),
            origin("https://contoso.vault.azure.net/keys")
        );
        assert!(origin("not a url").is_none());
    }

    #[test]
    fn service_error_description() {
        let body: ServiceErrorBody = serde_json::from_str(
            r#"{"error":{"code":"KeyNotFound","message":"A key with (name/id) x was not found"}}"#,
        )
        .unwrap();
        assert_eq!(
            body.error.describe(),
            "KeyNotFound: A key with (name/id) x was not found"
        );
    }
}
