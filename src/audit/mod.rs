//! Audit log — SQLite-based history of removal attempts.
//!
//! Every `remove` invocation is recorded with its outcome in a local
//! SQLite database at `<audit_dir>/audit.db`.
//!
//! Graceful degradation: if the database can't be opened or written to,
//! commands continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{KeyVaultError, Result};

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub vault: String,
    pub key_name: Option<String>,
    pub outcome: String,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database at `<audit_dir>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened.
    pub fn open(audit_dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(audit_dir);
        let conn = Connection::open(&db_path).ok()?;

        // Owner-only permissions on the database.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                vault       TEXT NOT NULL,
                key_name    TEXT,
                outcome     TEXT NOT NULL
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget: failures are only traced.
    pub fn log(&self, operation: &str, vault: &str, key_name: Option<&str>, outcome: &str) {
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, vault, key_name, outcome)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![now, operation, vault, key_name, outcome],
        ) {
            tracing::debug!(error = %e, "audit insert failed");
        }
    }

    /// Query recent audit entries, most recent first.
    ///
    /// - `limit`: maximum number of entries to return.
    /// - `since`: if provided, only entries at or after this timestamp.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let since_str = since.map(|ts| ts.to_rfc3339());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, vault, key_name, outcome
                 FROM audit_log
                 WHERE ?1 IS NULL OR timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| KeyVaultError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![since_str, limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    vault: row.get(3)?,
                    key_name: row.get(4)?,
                    outcome: row.get(5)?,
                })
            })
            .map_err(|e| KeyVaultError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| KeyVaultError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }

    /// Path to the audit database inside `audit_dir`.
    pub fn db_path(audit_dir: &Path) -> PathBuf {
        audit_dir.join("audit.db")
    }
}

/// Log one event under `audit_dir`, creating the directory if needed.
///
/// Never fails the calling command.
pub fn log_audit(audit_dir: &Path, op: &str, vault: &str, key: Option<&str>, outcome: &str) {
    if std::fs::create_dir_all(audit_dir).is_err() {
        tracing::debug!(dir = %audit_dir.display(), "audit directory unavailable");
        return;
    }

    if let Some(audit) = AuditLog::open(audit_dir) {
        audit.log(op, vault, key, outcome);
    }
}
