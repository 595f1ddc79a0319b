//! Progress events emitted while provisioning
//!
//! The orchestrator reports every stage to a [`ProvisionObserver`]; the CLI
//! prints them as the operator-facing trace.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionEvent {
    /// An existing folder was reused.
    Existing { name: String, id: String },
    /// A folder was created.
    Created { name: String, id: String },
    /// The lookup failed; creation will be attempted anyway.
    LookupFailed { name: String, reason: String },
    /// Creation failed; the folder's subtree is abandoned.
    CreateFailed { name: String, reason: String },
    /// Not attempted because an ancestor is unavailable.
    Skipped { name: String, ancestor: String },
}

impl fmt::Display for ProvisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionEvent::Existing { name, id } => {
                write!(f, "Folder '{}' already exists (id: {})", name, id)
            }
            ProvisionEvent::Created { name, id } => {
                write!(f, "Created folder '{}' (id: {})", name, id)
            }
            ProvisionEvent::LookupFailed { name, reason } => write!(
                f,
                "Could not check for folder '{}' ({}); creating it",
                name, reason
            ),
            ProvisionEvent::CreateFailed { name, reason } => {
                write!(f, "Failed to create folder '{}': {}", name, reason)
            }
            ProvisionEvent::Skipped { name, ancestor } => write!(
                f,
                "Skipped folder '{}' because '{}' is unavailable",
                name, ancestor
            ),
        }
    }
}

/// Receives provisioning progress.
pub trait ProvisionObserver: Send + Sync {
    fn on_event(&self, event: &ProvisionEvent);
}

/// Discards all events.
pub struct NoopObserver;

impl ProvisionObserver for NoopObserver {
    fn on_event(&self, _event: &ProvisionEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_lines() {
        let created = ProvisionEvent::Created {
            name: "data".into(),
            id: "1x".into(),
        };
        assert_eq!(created.to_string(), "Created folder 'data' (id: 1x)");

        let existing = ProvisionEvent::Existing {
            name: "Research_Project".into(),
            id: "0r".into(),
        };
        assert_eq!(
            existing.to_string(),
            "Folder 'Research_Project' already exists (id: 0r)"
        );

        let skipped = ProvisionEvent::Skipped {
            name: "data".into(),
            ancestor: "Research_Project".into(),
        };
        assert!(skipped.to_string().contains("'Research_Project' is unavailable"));
    }
}
