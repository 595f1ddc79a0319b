use bridge_traits::storage::RemoteFolder;
use std::fmt;

/// A folder resolved or created during this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
}

impl FolderRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<RemoteFolder> for FolderRecord {
    fn from(folder: RemoteFolder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
        }
    }
}

impl fmt::Display for FolderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
