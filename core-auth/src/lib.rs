//! # Authentication Module
//!
//! OAuth 2.0 credential lifecycle for the Drive provisioning tool.
//!
//! ## Overview
//!
//! The [`Authenticator`] reuses a cached credential when it is still valid,
//! refreshes it when it has expired, and otherwise runs the installed-app
//! consent flow through a loopback redirect. New or refreshed credentials
//! are persisted through a [`TokenStore`] before the session is handed out.
//!
//! ## Features
//!
//! - OAuth 2.0 authorization code flow with PKCE
//! - Token refresh with refresh-token carry-over
//! - JSON or binary credential cache over any `CredentialStore`
//! - Client secret file parsing (`installed` / `web` clients)

pub mod authenticator;
pub mod client_secret;
pub mod consent;
pub mod error;
pub mod oauth;
pub mod token_store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use authenticator::Authenticator;
pub use client_secret::ClientSecret;
pub use consent::{BrowserLauncher, ConsentFlow, LoopbackConsentFlow, PrintOnly, SystemBrowser};
pub use error::{AuthError, Result};
pub use oauth::{OAuthConfig, OAuthFlowManager, PkceVerifier, DRIVE_FILE_SCOPE};
pub use token_store::TokenStore;
pub use types::{AuthenticatedSession, CredentialSource, OAuthTokens};
