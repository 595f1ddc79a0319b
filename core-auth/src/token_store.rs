//! Persisted credential cache
//!
//! Serializes the OAuth token set into the opaque blob held by a
//! [`CredentialStore`]. Two encodings are supported: JSON, readable and
//! compatible with hand inspection, and a compact binary form via `bincode`.
//!
//! ## Security Features
//!
//! - Tokens are never logged or exposed in error messages
//! - A cache that cannot be decoded is reported as absent, never as an error
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{OAuthTokens, TokenStore};
//! use core_runtime::config::CacheFormat;
//! use std::sync::Arc;
//! # use bridge_traits::storage::CredentialStore;
//! # async fn example(store: Arc<dyn CredentialStore>) -> core_auth::Result<()> {
//! let token_store = TokenStore::new(store, CacheFormat::Json);
//!
//! let tokens = OAuthTokens::new("access".to_string(), Some("refresh".to_string()), 3600);
//! token_store.save(&tokens).await?;
//!
//! let cached = token_store.load().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use bincode::Options;
use bridge_traits::storage::CredentialStore;
use chrono::{TimeZone, Utc};
use core_runtime::config::CacheFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on a binary cache; anything larger is corrupt.
const MAX_BINARY_CACHE: u64 = 64 * 1024;

/// On-disk shape of the cached credential.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
    access_token: String,
    refresh_token: Option<String>,
    /// Unix timestamp, seconds
    expires_at: i64,
    #[serde(default)]
    scopes: Vec<String>,
}

impl From<&OAuthTokens> for StoredTokens {
    fn from(tokens: &OAuthTokens) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: tokens.expires_at.timestamp(),
            scopes: tokens.scopes.clone(),
        }
    }
}

impl StoredTokens {
    fn into_tokens(self) -> Option<OAuthTokens> {
        let expires_at = Utc.timestamp_opt(self.expires_at, 0).single()?;
        Some(OAuthTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            scopes: self.scopes,
        })
    }
}

/// Token persistence over a [`CredentialStore`].
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn CredentialStore>,
    format: CacheFormat,
}

impl TokenStore {
    pub fn new(store: Arc<dyn CredentialStore>, format: CacheFormat) -> Self {
        debug!(location = %store.describe(), format = %format, "Initializing TokenStore");
        Self { store, format }
    }

    pub fn format(&self) -> CacheFormat {
        self.format
    }

    /// Load the cached token set.
    ///
    /// Returns:
    /// - `Ok(Some(tokens))` if a decodable credential is cached
    /// - `Ok(None)` if nothing is cached or the cache is corrupt
    /// - `Err` if the underlying store cannot be read
    pub async fn load(&self) -> Result<Option<OAuthTokens>> {
        let data = match self.store.load().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!("No cached credential");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "Failed to read credential cache");
                return Err(AuthError::CredentialStorage(e.to_string()));
            }
        };

        match self.decode(&data).and_then(|stored| {
            stored
                .into_tokens()
                .ok_or_else(|| "expiry out of range".to_string())
        }) {
            Ok(tokens) => {
                debug!(
                    has_refresh_token = tokens.refresh_token.is_some(),
                    "Loaded cached credential"
                );
                Ok(Some(tokens))
            }
            Err(reason) => {
                warn!(
                    location = %self.store.describe(),
                    format = %self.format,
                    reason = %reason,
                    "Cached credential is unreadable; treating as absent"
                );
                Ok(None)
            }
        }
    }

    /// Persist the token set, replacing any previous value.
    pub async fn save(&self, tokens: &OAuthTokens) -> Result<()> {
        let stored = StoredTokens::from(tokens);
        let data = self.encode(&stored)?;

        self.store.save(&data).await.map_err(|e| {
            warn!(error = %e, "Failed to persist credential");
            AuthError::CredentialStorage(e.to_string())
        })?;

        info!(
            location = %self.store.describe(),
            has_refresh_token = stored.refresh_token.is_some(),
            "Credential cached"
        );
        Ok(())
    }

    /// Remove the cached credential.
    pub async fn clear(&self) -> Result<()> {
        self.store
            .clear()
            .await
            .map_err(|e| AuthError::CredentialStorage(e.to_string()))?;
        info!(location = %self.store.describe(), "Credential cache cleared");
        Ok(())
    }

    fn encode(&self, stored: &StoredTokens) -> Result<Vec<u8>> {
        match self.format {
            CacheFormat::Json => serde_json::to_vec_pretty(stored).map_err(|e| {
                AuthError::CredentialStorage(format!("Failed to serialize credential: {}", e))
            }),
            CacheFormat::Binary => binary_options().serialize(stored).map_err(|e| {
                AuthError::CredentialStorage(format!("Failed to serialize credential: {}", e))
            }),
        }
    }

    fn decode(&self, data: &[u8]) -> std::result::Result<StoredTokens, String> {
        match self.format {
            CacheFormat::Json => serde_json::from_slice(data).map_err(|e| e.to_string()),
            CacheFormat::Binary => binary_options()
                .deserialize(data)
                .map_err(|e| e.to_string()),
        }
    }
}

fn binary_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_BINARY_CACHE)
}
