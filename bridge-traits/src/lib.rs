//! # Host Bridge Traits
//!
//! Capability traits consumed by the provisioning core and implemented by the
//! desktop bridge or by test doubles.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry policy
//! - [`FolderStorage`](storage::FolderStorage) - Remote folder lookup and creation
//! - [`CredentialStore`](storage::CredentialStore) - Persisted credential blob
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Implementations
//! should convert platform-specific errors to `BridgeError` and include context
//! (file path, HTTP status) in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind `Arc`.

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::{CredentialStore, FolderStorage, RemoteFolder};
