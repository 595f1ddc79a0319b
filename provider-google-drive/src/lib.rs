//! # Google Drive Provider
//!
//! Implements the `FolderStorage` trait for Google Drive API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - Exact-name folder lookup under a parent or the Drive root
//! - Folder creation
//! - Mapping of Google API error envelopes to bridge errors

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GoogleDriveConnector;
pub use error::{GoogleDriveError, Result};
