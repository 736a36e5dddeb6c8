//! Durable credential storage
//!
//! Persists the session's tokens and user profile across process restarts.
//! The file-backed store keeps a single JSON document under the data
//! directory; the in-memory store backs tests and throwaway sessions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;

use td_core::auth::User;

use crate::Result;

/// Credentials persisted between runs
///
/// Keys match the original secure-store layout: accessToken, refreshToken,
/// deviceId and the serialized user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub device_id: Option<String>,
    pub user: Option<User>,
}

impl StoredCredentials {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none()
            && self.refresh_token.is_none()
            && self.device_id.is_none()
            && self.user.is_none()
    }
}

/// Storage interface for session credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load whatever is persisted; absent storage yields empty credentials
    async fn load(&self) -> Result<StoredCredentials>;

    /// Replace the persisted credentials
    async fn save(&self, credentials: &StoredCredentials) -> Result<()>;

    /// Remove all persisted credentials
    async fn clear(&self) -> Result<()>;
}

/// File-backed credential store using JSON
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store at `path`; the file is created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        let content = serde_json::to_string_pretty(credentials)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<StoredCredentials>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<StoredCredentials> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        *self.inner.write().await = credentials.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.write().await = StoredCredentials::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_credentials() -> StoredCredentials {
        StoredCredentials {
            access_token: Some("at-1".into()),
            refresh_token: Some("rt-1".into()),
            device_id: Some("dev-1".into()),
            user: Some(User {
                id: "u-1".into(),
                email: "a@b.c".into(),
                first_name: Some("Ada".into()),
                last_name: None,
                is_active: None,
                created_at: None,
                updated_at: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let store = FileCredentialStore::new(&path);

        let credentials = sample_credentials();
        store.save(&credentials).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, credentials);
    }

    #[tokio::test]
    async fn test_file_store_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("missing.json"));

        let loaded = store.load().await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("credentials.json");
        let store = FileCredentialStore::new(&path);

        store.save(&sample_credentials()).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_clear() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let store = FileCredentialStore::new(&path);

        store.save(&sample_credentials()).await.unwrap();
        store.clear().await.unwrap();
        assert!(!path.exists());
        assert!(store.load().await.unwrap().is_empty());

        // Clearing again is a no-op
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_uses_secure_store_key_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let store = FileCredentialStore::new(&path);

        store.save(&sample_credentials()).await.unwrap();
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["accessToken"], "at-1");
        assert_eq!(value["refreshToken"], "rt-1");
        assert_eq!(value["deviceId"], "dev-1");
        assert_eq!(value["user"]["email"], "a@b.c");
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryCredentialStore::default();
        assert!(store.load().await.unwrap().is_empty());

        store.save(&sample_credentials()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), sample_credentials());

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }
}
