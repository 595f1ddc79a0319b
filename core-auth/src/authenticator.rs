//! # Authenticator
//!
//! Produces an authenticated session for the remote storage API, reusing the
//! cached credential where possible.
//!
//! ## Lifecycle
//!
//! 1. Load the cached credential, if any.
//! 2. Present but expired and refreshable: refresh it.
//! 3. Absent, unusable, or granted for a narrower scope: run interactive consent.
//! 4. Whenever a new or refreshed credential was obtained, persist it before
//!    returning.
//!
//! A still-valid cached credential is returned without rewriting the cache.

use crate::consent::ConsentFlow;
use crate::error::Result;
use crate::oauth::OAuthFlowManager;
use crate::token_store::TokenStore;
use crate::types::{AuthenticatedSession, CredentialSource, OAuthTokens};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct Authenticator {
    oauth: OAuthFlowManager,
    token_store: TokenStore,
    consent: Arc<dyn ConsentFlow>,
}

impl Authenticator {
    pub fn new(
        oauth: OAuthFlowManager,
        token_store: TokenStore,
        consent: Arc<dyn ConsentFlow>,
    ) -> Self {
        Self {
            oauth,
            token_store,
            consent,
        }
    }

    /// Obtain a usable session.
    ///
    /// # Errors
    ///
    /// Consent denial or timeout, a rejected refresh, and a failure to persist
    /// the new credential are all fatal: no session is returned.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<AuthenticatedSession> {
        let required = &self.oauth.config().scopes;

        let cached = self.token_store.load().await?.filter(|tokens| {
            // Caches written without scope information predate scope tracking
            let covered = tokens.scopes.is_empty() || tokens.covers_scopes(required);
            if !covered {
                warn!(
                    granted = ?tokens.scopes,
                    "Cached credential lacks a required scope; consent is needed"
                );
            }
            covered
        });

        let (tokens, source) = match cached {
            Some(tokens) if tokens.is_valid() => {
                info!(expires_at = %tokens.expires_at, "Using cached credential");
                return Ok(AuthenticatedSession::new(&tokens, CredentialSource::Cache));
            }
            Some(tokens) if tokens.can_refresh() => {
                info!("Cached credential expired; refreshing");
                let refreshed = self.oauth.refresh_access_token(&tokens).await?;
                (refreshed, CredentialSource::Refreshed)
            }
            Some(_) => {
                info!("Cached credential expired and cannot be refreshed; requesting consent");
                (self.request_consent().await?, CredentialSource::Consent)
            }
            None => {
                info!("No usable cached credential; requesting consent");
                (self.request_consent().await?, CredentialSource::Consent)
            }
        };

        self.token_store.save(&tokens).await?;
        info!(source = %source, expires_at = %tokens.expires_at, "Authenticated");

        Ok(AuthenticatedSession::new(&tokens, source))
    }

    /// Drop the cached credential so the next run asks for consent.
    pub async fn forget_credentials(&self) -> Result<()> {
        self.token_store.clear().await
    }

    async fn request_consent(&self) -> Result<OAuthTokens> {
        self.consent.obtain_tokens(&self.oauth).await
    }
}
