//! Existing-folder lookup
//!
//! Lookups fail open: a remote error is logged and reported as "not found"
//! so that the caller goes on to create the folder. On a transient error this
//! can produce a duplicate, which is accepted.

use crate::record::FolderRecord;
use bridge_traits::storage::FolderStorage;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Outcome of one lookup, with the failure kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(FolderRecord),
    NotFound,
    /// The remote query failed; treated as not found.
    Failed(String),
}

impl Lookup {
    pub fn found(self) -> Option<FolderRecord> {
        match self {
            Lookup::Found(record) => Some(record),
            Lookup::NotFound | Lookup::Failed(_) => None,
        }
    }
}

pub struct FolderResolver {
    storage: Arc<dyn FolderStorage>,
}

impl FolderResolver {
    pub fn new(storage: Arc<dyn FolderStorage>) -> Self {
        Self { storage }
    }

    /// Find a live folder named exactly `name` directly under `parent_id`
    /// (or the storage root).
    ///
    /// When several folders share the name, the first one listed is returned.
    pub async fn lookup(&self, name: &str, parent_id: Option<&str>) -> Option<FolderRecord> {
        self.resolve(name, parent_id).await.found()
    }

    /// Like [`lookup`](Self::lookup) but distinguishes a failed query from a
    /// miss.
    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str, parent_id: Option<&str>) -> Lookup {
        let folders = match self.storage.list_folders(name, parent_id).await {
            Ok(folders) => folders,
            Err(e) => {
                warn!(error = %e, "Folder lookup failed; treating it as missing");
                return Lookup::Failed(e.to_string());
            }
        };

        // Backends may match loosely; only exact names count
        let mut matches = folders.into_iter().filter(|folder| folder.name == name);
        let Some(first) = matches.next() else {
            debug!("No existing folder");
            return Lookup::NotFound;
        };

        let others = matches.count();
        if others > 0 {
            warn!(
                candidates = others + 1,
                chosen = %first.id,
                "Several folders share this name; using the first listed"
            );
        }

        Lookup::Found(first.into())
    }
}
