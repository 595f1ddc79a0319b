use crate::error::{ProvisionError, Result};
use crate::record::FolderRecord;
use bridge_traits::storage::FolderStorage;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Creates exactly one folder per call.
pub struct FolderCreator {
    storage: Arc<dyn FolderStorage>,
}

impl FolderCreator {
    pub fn new(storage: Arc<dyn FolderStorage>) -> Self {
        Self { storage }
    }

    /// Create `name` under `parent_id` (or the storage root).
    ///
    /// Remote failures come back as [`ProvisionError::Creation`]; so does a
    /// response without an identifier, since nothing could be placed under it.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, parent_id: Option<&str>) -> Result<FolderRecord> {
        let failure = |reason: String| ProvisionError::Creation {
            name: name.to_string(),
            parent: parent_id.map(String::from),
            reason,
        };

        let folder = self
            .storage
            .create_folder(name, parent_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Folder creation failed");
                failure(e.to_string())
            })?;

        if folder.id.is_empty() {
            error!("Folder creation returned no identifier");
            return Err(failure("remote returned an empty identifier".to_string()));
        }

        info!(folder_id = %folder.id, "Folder created");
        Ok(FolderRecord::new(folder.id, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::storage::RemoteFolder;

    struct CreateStub {
        result: fn(&str, Option<&str>) -> BridgeResult<RemoteFolder>,
    }

    #[async_trait]
    impl FolderStorage for CreateStub {
        async fn list_folders(&self, _name: &str, _parent_id: Option<&str>) -> BridgeResult<Vec<RemoteFolder>> {
            panic!("creator must never list folders");
        }

        async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> BridgeResult<RemoteFolder> {
            (self.result)(name, parent_id)
        }
    }

    fn creator(result: fn(&str, Option<&str>) -> BridgeResult<RemoteFolder>) -> FolderCreator {
        FolderCreator::new(Arc::new(CreateStub { result }))
    }

    #[tokio::test]
    async fn test_create_under_parent() {
        let creator = creator(|name, parent| {
            Ok(RemoteFolder::new(format!("{}-id", name), name).with_parent(parent.unwrap()))
        });

        let record = creator.create("data", Some("root-id")).await.unwrap();
        assert_eq!(record, FolderRecord::new("data-id", "data"));
    }

    #[tokio::test]
    async fn test_create_at_storage_root() {
        let creator = creator(|name, parent| {
            assert!(parent.is_none());
            Ok(RemoteFolder::new("root-id", name))
        });

        let record = creator.create("Research_Project", None).await.unwrap();
        assert_eq!(record.id, "root-id");
    }

    #[tokio::test]
    async fn test_create_failure_is_typed() {
        let creator = creator(|_, _| {
            Err(BridgeError::Remote {
                status: 403,
                message: "storageQuotaExceeded".to_string(),
            })
        });

        let err = creator.create("models", Some("root-id")).await.unwrap_err();
        let ProvisionError::Creation {
            name,
            parent,
            reason,
        } = err;
        assert_eq!(name, "models");
        assert_eq!(parent.as_deref(), Some("root-id"));
        assert!(reason.contains("storageQuotaExceeded"));
    }

    #[tokio::test]
    async fn test_create_without_identifier_fails() {
        let creator = creator(|name, _| Ok(RemoteFolder::new("", name)));
        assert!(creator.create("data", Some("root-id")).await.is_err());
    }
}
