//! # Provisioning Orchestrator
//!
//! Idempotent upsert of a folder tree, in pre-order:
//!
//! ```text
//! for each node:
//!     reuse the existing folder if the lookup finds one
//!     otherwise create it
//!     if creation fails, skip the node's subtree
//! ```
//!
//! A child is only ever looked up or created under an identifier that was
//! just confirmed for its parent. Siblings are independent of each other.
//! No retries happen here; those belong to the transport.

use crate::creator::FolderCreator;
use crate::error::ProvisionError;
use crate::events::{NoopObserver, ProvisionEvent, ProvisionObserver};
use crate::report::{NodeOutcome, ProvisionReport, ProvisionedNode};
use crate::resolver::{FolderResolver, Lookup};
use crate::tree::FolderSpec;
use bridge_traits::storage::FolderStorage;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, instrument, warn};

type NodeFuture<'a> = Pin<Box<dyn Future<Output = ProvisionedNode> + Send + 'a>>;

pub struct ProvisioningOrchestrator {
    resolver: FolderResolver,
    creator: FolderCreator,
    observer: Arc<dyn ProvisionObserver>,
}

impl ProvisioningOrchestrator {
    pub fn new(storage: Arc<dyn FolderStorage>) -> Self {
        Self {
            resolver: FolderResolver::new(storage.clone()),
            creator: FolderCreator::new(storage),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProvisionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Ensure every folder of `tree` exists under the storage root.
    #[instrument(skip_all, fields(root = %tree.name, nodes = tree.node_count()))]
    pub async fn provision(&self, tree: &FolderSpec) -> ProvisionReport {
        let root = self.provision_node(tree, None).await;
        let report = ProvisionReport::new(root);

        info!(
            status = %report.status(),
            created = report.created_count(),
            existing = report.existing_count(),
            failed = report.failed_count(),
            "Provisioning finished"
        );
        report
    }

    fn provision_node<'a>(&'a self, spec: &'a FolderSpec, parent_id: Option<&'a str>) -> NodeFuture<'a> {
        Box::pin(async move {
            let outcome = self.upsert(&spec.name, parent_id).await;

            let children = match outcome.id() {
                Some(id) => {
                    let mut children = Vec::with_capacity(spec.children.len());
                    for child in &spec.children {
                        children.push(self.provision_node(child, Some(id)).await);
                    }
                    children
                }
                None => spec
                    .children
                    .iter()
                    .map(|child| self.skip_subtree(child, &spec.name))
                    .collect(),
            };

            ProvisionedNode {
                name: spec.name.clone(),
                parent_id: parent_id.map(String::from),
                outcome,
                children,
            }
        })
    }

    async fn upsert(&self, name: &str, parent_id: Option<&str>) -> NodeOutcome {
        match self.resolver.resolve(name, parent_id).await {
            Lookup::Found(record) => {
                self.observer.on_event(&ProvisionEvent::Existing {
                    name: name.to_string(),
                    id: record.id.clone(),
                });
                return NodeOutcome::Existing(record.id);
            }
            Lookup::Failed(reason) => {
                self.observer.on_event(&ProvisionEvent::LookupFailed {
                    name: name.to_string(),
                    reason,
                });
            }
            Lookup::NotFound => {}
        }

        match self.creator.create(name, parent_id).await {
            Ok(record) => {
                self.observer.on_event(&ProvisionEvent::Created {
                    name: name.to_string(),
                    id: record.id.clone(),
                });
                NodeOutcome::Created(record.id)
            }
            Err(ProvisionError::Creation { reason, .. }) => {
                self.observer.on_event(&ProvisionEvent::CreateFailed {
                    name: name.to_string(),
                    reason: reason.clone(),
                });
                NodeOutcome::Failed(reason)
            }
        }
    }

    fn skip_subtree(&self, spec: &FolderSpec, ancestor: &str) -> ProvisionedNode {
        warn!(folder = %spec.name, %ancestor, "Skipping folder under unavailable parent");
        self.observer.on_event(&ProvisionEvent::Skipped {
            name: spec.name.clone(),
            ancestor: ancestor.to_string(),
        });

        ProvisionedNode {
            name: spec.name.clone(),
            parent_id: None,
            outcome: NodeOutcome::Skipped,
            children: spec
                .children
                .iter()
                .map(|child| self.skip_subtree(child, ancestor))
                .collect(),
        }
    }
}
