//! # Core Provision
//!
//! Ensures a fixed folder tree exists in remote storage, reusing folders that
//! are already there.
//!
//! ## Overview
//!
//! - [`FolderResolver`] - finds an existing folder by exact name under a parent,
//!   failing open on remote errors
//! - [`FolderCreator`] - creates exactly one folder per call
//! - [`ProvisioningOrchestrator`] - walks a [`FolderSpec`] in pre-order and
//!   produces a [`ProvisionReport`]
//!
//! Progress is reported through a [`ProvisionObserver`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_provision::{FolderSpec, ProvisioningOrchestrator};
//!
//! let orchestrator = ProvisioningOrchestrator::new(storage);
//! let report = orchestrator.provision(&FolderSpec::research_project()).await;
//! println!("{}", report);
//! ```

pub mod creator;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod record;
pub mod report;
pub mod resolver;
pub mod tree;

pub use creator::FolderCreator;
pub use error::{ProvisionError, Result};
pub use events::{NoopObserver, ProvisionEvent, ProvisionObserver};
pub use orchestrator::ProvisioningOrchestrator;
pub use record::FolderRecord;
pub use report::{NodeOutcome, ProvisionReport, ProvisionStatus, ProvisionedNode};
pub use resolver::{FolderResolver, Lookup};
pub use tree::{FolderSpec, DEFAULT_CHILDREN, DEFAULT_ROOT};
