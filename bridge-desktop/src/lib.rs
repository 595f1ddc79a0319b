//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with retry and backoff
//! - `CredentialStore` backed by a single file (`FileCredentialStore`)
//! - `CredentialStore` backed by the OS keychain (`KeyringCredentialStore`)
//!
//! ## Feature Flags
//!
//! - `keyring-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FileCredentialStore, ReqwestHttpClient};
//!
//! let http_client = ReqwestHttpClient::new()?;
//! let cache = FileCredentialStore::new("token.json");
//! ```

mod credential_store;
mod http;

#[cfg(feature = "keyring-store")]
mod secure_store;

pub use credential_store::FileCredentialStore;
pub use http::ReqwestHttpClient;

#[cfg(feature = "keyring-store")]
pub use secure_store::KeyringCredentialStore;
