//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the provisioning tool:
//! - Logging and tracing infrastructure
//! - Configuration management with fail-fast validation
//!
//! ## Overview
//!
//! Every other workspace crate logs through `tracing`; this crate owns the
//! subscriber setup and the [`ProvisionConfig`](config::ProvisionConfig)
//! that the binary assembles from command-line flags and environment.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
