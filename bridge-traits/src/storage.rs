//! Storage Abstractions
//!
//! Provides platform-agnostic traits for the remote folder capability and for
//! persisting the opaque credential blob between runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A folder as reported by the remote storage provider.
///
/// The identifier is assigned by the backend and is opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolder {
    /// Provider-assigned identifier
    pub id: String,
    /// Folder name, exactly as stored remotely
    pub name: String,
    /// Parent folder identifiers
    #[serde(default)]
    pub parent_ids: Vec<String>,
}

impl RemoteFolder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_ids: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_ids.push(parent_id.into());
        self
    }
}

/// Remote hierarchical storage capability.
///
/// Only the two operations needed to provision a folder tree are exposed.
/// Backends do not enforce name uniqueness, so `list_folders` may return
/// several folders with the same name under the same parent.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FolderStorage;
///
/// async fn ensure(storage: &dyn FolderStorage) -> Result<String> {
///     if let Some(found) = storage.list_folders("data", None).await?.into_iter().next() {
///         return Ok(found.id);
///     }
///     Ok(storage.create_folder("data", None).await?.id)
/// }
/// ```
#[async_trait]
pub trait FolderStorage: Send + Sync {
    /// List non-trashed folders named exactly `name` that are direct children
    /// of `parent_id`, or of the storage root when `parent_id` is `None`.
    ///
    /// Returns a single page of results.
    async fn list_folders(&self, name: &str, parent_id: Option<&str>) -> Result<Vec<RemoteFolder>>;

    /// Create a folder named `name` under `parent_id` (or the storage root).
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<RemoteFolder>;
}

/// Persisted credential blob storage.
///
/// Holds exactly one opaque value. The serialization format is owned by the
/// caller; implementations only move bytes to and from durable storage.
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Never log or expose the stored bytes
/// - Overwrite any previous value on `save`
/// - Restrict access to the current user where the platform allows it
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored blob
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Store the blob, replacing any previous value
    async fn save(&self, data: &[u8]) -> Result<()>;

    /// Remove the stored blob. Succeeds when nothing is stored.
    async fn clear(&self) -> Result<()>;

    /// Human-readable location, used in log and error messages
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_folder_builder() {
        let folder = RemoteFolder::new("abc", "data").with_parent("root-id");

        assert_eq!(folder.id, "abc");
        assert_eq!(folder.name, "data");
        assert_eq!(folder.parent_ids, vec!["root-id".to_string()]);
    }

    #[test]
    fn test_remote_folder_deserializes_without_parents() {
        let folder: RemoteFolder = serde_json::from_str(r#"{"id":"1","name":"x"}"#).unwrap();
        assert!(folder.parent_ids.is_empty());
    }
}
