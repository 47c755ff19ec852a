//! Durable session persistence
//!
//! One JSON-encoded record per storage key. The file store is the production
//! backend; the memory store backs tests and ephemeral deployments.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use capexflow_domain::{CapexFlowError, Result};
use tokio::sync::RwLock;
use tracing::debug;

use super::session::Session;

/// Trait for durable session storage
///
/// Abstracts the side-store so the session manager can be tested without
/// touching the filesystem.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist the session under the given key, replacing any previous record
    async fn store(&self, key: &str, session: &Session) -> Result<()>;

    /// Load the session stored under the key, if any
    async fn load(&self, key: &str) -> Result<Option<Session>>;

    /// Delete the record under the key. Deleting a missing record is not an
    /// error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Filesystem-backed session store (`<dir>/<key>.json`)
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn store(&self, key: &str, session: &Session) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CapexFlowError::Internal(format!("failed to create session store dir: {e}"))
        })?;

        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| CapexFlowError::Internal(format!("failed to encode session: {e}")))?;

        let path = self.path_for(key);
        tokio::fs::write(&path, json).await.map_err(|e| {
            CapexFlowError::Internal(format!("failed to write {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "session persisted");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Session>> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CapexFlowError::Internal(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt record is unrecoverable; treat it as absent.
                debug!(path = %path.display(), error = %e, "discarding unreadable session record");
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CapexFlowError::Internal(format!(
                "failed to delete {}: {e}",
                path.display()
            ))),
        }
    }
}

/// In-memory session store for tests and ephemeral deployments
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn store(&self, key: &str, session: &Session) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), session.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Session>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_session() -> Session {
        Session {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            issued_at: Utc::now(),
            expires_in: 3600,
            scope: Some("read".to_string()),
        }
    }

    #[tokio::test]
    async fn file_store_round_trips_a_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path());

        let session = sample_session();
        store.store("sienge_session", &session).await.expect("store");

        let loaded = store.load("sienge_session").await.expect("load");
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn file_store_load_returns_none_for_missing_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path());

        assert_eq!(store.load("sienge_session").await.expect("load"), None);
    }

    #[tokio::test]
    async fn file_store_discards_corrupt_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("sienge_session.json"), b"not json").expect("write");

        let store = FileSessionStore::new(dir.path());
        assert_eq!(store.load("sienge_session").await.expect("load"), None);
    }

    #[tokio::test]
    async fn file_store_delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path());

        store.store("sienge_session", &sample_session()).await.expect("store");
        store.delete("sienge_session").await.expect("first delete");
        store.delete("sienge_session").await.expect("second delete");

        assert_eq!(store.load("sienge_session").await.expect("load"), None);
    }

    #[tokio::test]
    async fn memory_store_round_trips_a_session() {
        let store = MemorySessionStore::new();
        let session = sample_session();

        store.store("sienge_session", &session).await.expect("store");
        assert_eq!(store.load("sienge_session").await.expect("load"), Some(session));

        store.delete("sienge_session").await.expect("delete");
        assert_eq!(store.load("sienge_session").await.expect("load"), None);
    }
}
