//! SQLite adapter: Implementation of ArtifactStore.
//!
//! Provides local persistence for trained models, encoders and the feature
//! column list.
//!
//! # Integrity
//!
//! Every payload is stored with its SHA-256 digest. The digest is checked on
//! every load, so a row modified outside this adapter is reported as
//! corrupted instead of being deserialized.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. A poisoned mutex (from a panic
//! in another thread) is reported as `StorageError::LockPoisoned`.
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::ports::{ArtifactInfo, ArtifactStore};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Integrity check failed for artifact {name}: stored digest does not match payload")]
    Integrity { name: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Hex-encoded SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// SQLite artifact store.
pub struct SqliteArtifactStore {
    conn: Mutex<Connection>,
}

impl SqliteArtifactStore {
    /// Open (or create) the database at `path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        tracing::debug!(path = %path.display(), "Opened artifact store");
        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS artifacts (
                name TEXT PRIMARY KEY,
                payload BLOB NOT NULL,
                sha256 TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    #[cfg(test)]
    fn tamper(&self, name: &str, payload: &[u8]) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE artifacts SET payload = ?1 WHERE name = ?2",
            params![payload, name],
        )?;
        Ok(())
    }
}

/// Read one payload and verify its stored digest.
fn read_checked(conn: &Connection, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
    let row: Option<(Vec<u8>, String)> = conn
        .query_row(
            "SELECT payload, sha256 FROM artifacts WHERE name = ?1",
            params![name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((payload, digest)) => {
            if sha256_hex(&payload) != digest {
                tracing::error!(artifact = name, "Artifact digest mismatch");
                return Err(StorageError::Integrity {
                    name: name.to_string(),
                });
            }
            Ok(Some(payload))
        }
        None => Ok(None),
    }
}

impl ArtifactStore for SqliteArtifactStore {
    type Error = StorageError;

    fn save_artifacts(&self, blobs: &[(&str, &[u8])]) -> Result<(), Self::Error> {
        let mut conn = self.lock()?;
        let now = chrono::Utc::now().to_rfc3339();

        let tx = conn.transaction()?;
        for (name, payload) in blobs {
            tx.execute(
                r"
                INSERT OR REPLACE INTO artifacts (name, payload, sha256, created_at)
                VALUES (?1, ?2, ?3, ?4)
                ",
                params![name, payload, sha256_hex(payload), now],
            )?;
        }
        tx.commit()?;

        tracing::info!(count = blobs.len(), "Saved artifacts to storage");
        Ok(())
    }

    fn load_artifact(&self, name: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        let conn = self.lock()?;
        read_checked(&conn, name)
    }

    fn load_artifacts(&self, names: &[&str]) -> Result<Vec<Option<Vec<u8>>>, Self::Error> {
        let mut conn = self.lock()?;

        // One read transaction so a concurrent save is seen entirely or not at all
        let tx = conn.transaction()?;
        let blobs = names
            .iter()
            .map(|name| read_checked(&tx, name))
            .collect::<Result<Vec<_>, _>>()?;
        tx.commit()?;

        Ok(blobs)
    }

    fn list_artifacts(&self) -> Result<Vec<ArtifactInfo>, Self::Error> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r"
            SELECT name, length(payload), sha256, created_at
            FROM artifacts
            ORDER BY name
            ",
        )?;

        let infos = stmt
            .query_map([], |row| {
                let size: i64 = row.get(1)?;
                Ok(ArtifactInfo {
                    name: row.get(0)?,
                    size_bytes: usize::try_from(size).unwrap_or_default(),
                    sha256: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(infos)
    }

    fn delete_artifact(&self, name: &str) -> Result<(), Self::Error> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM artifacts WHERE name = ?1", params![name])?;
        tracing::info!(artifact = name, "Deleted artifact from storage");
        Ok(())
    }
}
