//! File-backed credential cache

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::CredentialStore,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Stores the credential blob in a single file.
///
/// Writes go to a sibling temp file that is renamed over the target, so an
/// interrupted save never leaves a truncated cache behind. On Unix the file is
/// created with `0600` permissions.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "credentials".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, action: &str, e: std::io::Error) -> BridgeError {
        BridgeError::OperationFailed(format!(
            "Failed to {} credential cache {}: {}",
            action,
            self.path.display(),
            e
        ))
    }

    /// Write `data` to a fresh private file at `path`.
    ///
    /// On Unix the file is opened with mode `0600`; a stale file left by an
    /// earlier run is narrowed to `0600` before anything is written into it.
    async fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await?;
        }
        file.write_all(data).await?;
        file.sync_all().await
    }

    async fn replace_with_temp(&self, temp: &Path, data: &[u8]) -> Result<()> {
        Self::write_private(temp, data)
            .await
            .map_err(|e| self.io_error("write", e))?;
        fs::rename(temp, &self.path)
            .await
            .map_err(|e| self.io_error("replace", e))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(data) => {
                debug!(path = %self.path.display(), bytes = data.len(), "Loaded credential cache");
                Ok(Some(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No credential cache present");
                Ok(None)
            }
            Err(e) => Err(self.io_error("read", e)),
        }
    }

    async fn save(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error("create directory for", e))?;
            }
        }

        let temp = self.temp_path();
        if let Err(e) = self.replace_with_temp(&temp, data).await {
            // The temp file holds the full credential
            if let Err(cleanup) = fs::remove_file(&temp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(error = %cleanup, "Failed to remove temporary credential file");
                }
            }
            return Err(e);
        }

        debug!(path = %self.path.display(), "Saved credential cache");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("remove", e)),
        }
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("token.json"));

        store.save(b"first").await.unwrap();
        store.save(b"second").await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(b"second".to_vec()));
        assert!(!store.temp_path().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));
        store.save(b"secret").await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_temp_file_is_narrowed_before_write() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));
        let temp = store.temp_path();
        std::fs::write(&temp, b"old").unwrap();
        std::fs::set_permissions(&temp, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileCredentialStore::write_private(&temp, b"refresh-token")
            .await
            .unwrap();

        let mode = std::fs::metadata(&temp).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read(&temp).unwrap(), b"refresh-token");
    }

    #[tokio::test]
    async fn test_failed_replace_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("token.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("occupied"), b"x").unwrap();
        let store = FileCredentialStore::new(&target);

        let result = store.save(b"refresh-token").await;

        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
        assert!(!store.temp_path().exists());
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));

        store.clear().await.unwrap();
        store.save(b"x").await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[test]
    fn test_describe_names_path() {
        let store = FileCredentialStore::new("token.json");
        assert_eq!(store.describe(), "file token.json");
    }
}
