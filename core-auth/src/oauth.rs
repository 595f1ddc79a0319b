//! OAuth 2.0 Authorization Flow Manager with PKCE Support
//!
//! This module implements RFC 6749 (OAuth 2.0) and RFC 7636 (PKCE) for the
//! installed-application flow against Google's authorization server.
//!
//! # Overview
//!
//! The OAuth flow manager handles:
//! - Building authorization URLs with PKCE challenge
//! - Exchanging authorization codes for tokens
//! - Refreshing access tokens
//! - State verification for CSRF protection
//!
//! # Security
//!
//! - Generates cryptographically secure random state and code verifier
//! - Never logs sensitive values (tokens, codes, verifiers)
//!
//! # Example
//!
//! ```no_run
//! use core_auth::oauth::{OAuthConfig, OAuthFlowManager, DRIVE_FILE_SCOPE};
//! use std::sync::Arc;
//!
//! # fn example() -> core_auth::Result<()> {
//! # use bridge_traits::http::HttpClient;
//! # let http_client: Arc<dyn HttpClient> = todo!();
//! let config = OAuthConfig::google("your-client-id", None, vec![DRIVE_FILE_SCOPE.to_string()]);
//!
//! let flow_manager = OAuthFlowManager::new(config, http_client);
//! let (auth_url, pkce_verifier) = flow_manager.build_auth_url("http://localhost:8080/")?;
//! // Send the user to auth_url...
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Access limited to files and folders this application created.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// OAuth 2.0 client configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret (optional for public clients)
    pub client_secret: Option<String>,
    /// List of OAuth scopes to request
    pub scopes: Vec<String>,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
}

impl OAuthConfig {
    /// Configuration against Google's default endpoints.
    pub fn google(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            scopes,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }
}

/// PKCE (Proof Key for Code Exchange) verifier.
///
/// Holds the code verifier and the CSRF state for one authorization attempt.
/// Only the challenge derived from the verifier is sent with the
/// authorization request.
#[derive(Debug, Clone)]
pub struct PkceVerifier {
    verifier: String,
    state: String,
}

impl PkceVerifier {
    /// Create a new PKCE verifier with cryptographically secure random values.
    ///
    /// Generates a 32-byte code verifier and a 16-byte state, both
    /// base64-url-encoded without padding.
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();

        // 43 characters once encoded, within RFC 7636's 43-128
        let mut verifier_bytes = [0u8; 32];
        rng.fill(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

        let mut state_bytes = [0u8; 16];
        rng.fill(&mut state_bytes);
        let state = URL_SAFE_NO_PAD.encode(state_bytes);

        Self { verifier, state }
    }

    /// Get the code verifier string.
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// Get the state parameter.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Compute the code challenge from the verifier.
    ///
    /// Uses S256 method: BASE64URL(SHA256(code_verifier))
    pub fn challenge(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.verifier.as_bytes());
        let hash = hasher.finalize();
        URL_SAFE_NO_PAD.encode(hash)
    }
}

impl Default for PkceVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// OAuth 2.0 flow manager.
///
/// Handles the authorization code flow with PKCE and token refresh.
pub struct OAuthFlowManager {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl OAuthFlowManager {
    /// Create a new OAuth flow manager with the given configuration.
    pub fn new(config: OAuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL with PKCE challenge.
    ///
    /// Returns the URL the user should visit together with the verifier that
    /// must be presented when exchanging the authorization code.
    ///
    /// Always requests offline access and forces the consent screen so that
    /// Google issues a refresh token even for a previously authorized client.
    #[instrument(skip(self))]
    pub fn build_auth_url(&self, redirect_uri: &str) -> Result<(String, PkceVerifier)> {
        let verifier = PkceVerifier::new();
        let challenge = verifier.challenge();

        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::Other(format!("Invalid auth URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("redirect_uri", redirect_uri);
            query.append_pair("response_type", "code");
            query.append_pair("scope", &self.config.scopes.join(" "));
            query.append_pair("state", verifier.state());
            query.append_pair("code_challenge", &challenge);
            query.append_pair("code_challenge_method", "S256");
            query.append_pair("access_type", "offline");
            query.append_pair("prompt", "consent");
        }

        debug!("Built authorization URL");

        Ok((url.to_string(), verifier))
    }

    /// Exchange an authorization code for OAuth tokens.
    ///
    /// `redirect_uri` must be the same value passed to [`build_auth_url`].
    ///
    /// # Errors
    ///
    /// - [`AuthError::StateMismatch`] if the callback state differs
    /// - [`AuthError::InvalidAuthCode`] if the token endpoint rejects the code
    /// - [`AuthError::NetworkError`] on transport failure
    ///
    /// [`build_auth_url`]: OAuthFlowManager::build_auth_url
    #[instrument(skip(self, code, verifier))]
    pub async fn exchange_code(
        &self,
        code: &str,
        state: &str,
        verifier: &PkceVerifier,
        redirect_uri: &str,
    ) -> Result<OAuthTokens> {
        if state != verifier.state() {
            warn!("OAuth state mismatch in authorization callback");
            return Err(AuthError::StateMismatch {
                expected: verifier.state().to_string(),
                actual: state.to_string(),
            });
        }

        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.config.client_id.as_str()),
            ("code_verifier", verifier.verifier()),
        ];
        if let Some(ref client_secret) = self.config.client_secret {
            params.push(("client_secret", client_secret.as_str()));
        }

        debug!("Exchanging authorization code for tokens");

        // Authorization codes are single-use; a replay only yields invalid_grant
        let response = self
            .post_token_request(&params, Some(RetryPolicy::no_retry()))
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        if !response.is_success() {
            let reason = token_error_reason(&response);
            warn!(
                status = response.status,
                error = %reason,
                "Token exchange failed while exchanging authorization code"
            );
            return Err(AuthError::InvalidAuthCode(format!(
                "Token endpoint returned {}: {}",
                response.status, reason
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::Other(format!("Failed to parse token response: {}", e)))?;

        info!(
            "Successfully exchanged code for tokens (expires in {}s)",
            token_response.expires_in
        );

        Ok(token_response.into_tokens(None, &self.config.scopes))
    }

    /// Refresh an access token using the refresh token of `tokens`.
    ///
    /// If the server does not rotate the refresh token, the existing one is
    /// carried over. Granted scopes carry over the same way.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenRefreshFailed`] if no refresh token is
    /// present, the endpoint rejects it, or the request cannot be sent.
    #[instrument(skip(self, tokens))]
    pub async fn refresh_access_token(&self, tokens: &OAuthTokens) -> Result<OAuthTokens> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::TokenRefreshFailed("No refresh token available".into()))?;

        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
        ];
        if let Some(ref client_secret) = self.config.client_secret {
            params.push(("client_secret", client_secret.as_str()));
        }

        debug!("Refreshing access token");

        let response = self
            .post_token_request(&params, None)
            .await
            .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?;

        if !response.is_success() {
            let reason = token_error_reason(&response);
            warn!(
                status = response.status,
                error = %reason,
                "Token refresh rejected"
            );
            return Err(AuthError::TokenRefreshFailed(format!(
                "Token endpoint returned {}: {}",
                response.status, reason
            )));
        }

        let token_response: TokenResponse = response.json().map_err(|e| {
            AuthError::TokenRefreshFailed(format!("Failed to parse token response: {}", e))
        })?;

        info!(
            "Successfully refreshed token (expires in {}s)",
            token_response.expires_in
        );

        let fallback_scopes = if tokens.scopes.is_empty() {
            &self.config.scopes
        } else {
            &tokens.scopes
        };
        Ok(token_response.into_tokens(Some(refresh_token), fallback_scopes))
    }

    /// POST a form to the token endpoint.
    ///
    /// `policy` of `None` leaves retries to the transport default.
    async fn post_token_request(
        &self,
        params: &[(&str, &str)],
        policy: Option<RetryPolicy>,
    ) -> bridge_traits::error::Result<HttpResponse> {
        let encoded = serde_urlencoded::to_string(params).map_err(|e| {
            bridge_traits::error::BridgeError::OperationFailed(format!(
                "Failed to encode token request: {}",
                e
            ))
        })?;

        let request =
            HttpRequest::new(HttpMethod::Post, self.config.token_url.clone()).form(encoded);

        match policy {
            Some(policy) => self.http_client.execute_with_retry(request, policy).await,
            None => self.http_client.execute(request).await,
        }
    }
}

/// Token response from the OAuth provider.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[allow(dead_code)]
    token_type: Option<String>,
    /// Space-separated granted scopes
    scope: Option<String>,
}

impl TokenResponse {
    fn into_tokens(self, previous_refresh: Option<&str>, fallback_scopes: &[String]) -> OAuthTokens {
        let scopes: Vec<String> = match self.scope {
            Some(ref granted) => granted.split_whitespace().map(String::from).collect(),
            None => fallback_scopes.to_vec(),
        };
        let refresh_token = self
            .refresh_token
            .or_else(|| previous_refresh.map(String::from));

        OAuthTokens::new(self.access_token, refresh_token, self.expires_in).with_scopes(scopes)
    }
}

fn default_expires_in() -> i64 {
    3600
}

/// Error body of the token endpoint (RFC 6749 section 5.2).
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

fn token_error_reason(response: &HttpResponse) -> String {
    match response.json::<TokenErrorResponse>() {
        Ok(TokenErrorResponse {
            error,
            error_description: Some(description),
        }) => format!("{} ({})", error, description),
        Ok(TokenErrorResponse { error, .. }) => error,
        Err(_) => response
            .text()
            .unwrap_or_else(|_| "Unable to read error response".to_string()),
    }
}
