use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("Failed to create folder '{name}' under {}: {reason}", parent_label(.parent))]
    Creation {
        name: String,
        parent: Option<String>,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ProvisionError>;

pub(crate) fn parent_label(parent: &Option<String>) -> String {
    match parent {
        Some(id) => format!("parent {}", id),
        None => "the storage root".to_string(),
    }
}
