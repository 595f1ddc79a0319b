use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds before the real expiry at which a token is treated as expired.
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// OAuth 2.0 token set.
///
/// Contains the access token, the optional refresh token, the expiration
/// time and the scopes the user actually granted.
///
/// # Security
///
/// Tokens should be stored securely and never logged. The `Debug`
/// implementation redacts sensitive information.
///
/// # Examples
///
/// ```
/// use core_auth::OAuthTokens;
///
/// let tokens = OAuthTokens::new(
///     "ya29.a0...".to_string(),
///     Some("1//0g...".to_string()),
///     3600,
/// );
///
/// assert!(tokens.is_valid());
/// assert!(tokens.can_refresh());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    /// The access token used for API requests
    pub access_token: String,
    /// The refresh token used to obtain new access tokens
    pub refresh_token: Option<String>,
    /// When the access token expires (UTC)
    pub expires_at: DateTime<Utc>,
    /// Scopes granted to this token
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl OAuthTokens {
    /// Create a new token set expiring `expires_in` seconds from now
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
            scopes: Vec::new(),
        }
    }

    /// Attach the granted scopes
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Check if the access token is expired or will expire within
    /// [`EXPIRY_BUFFER_SECS`].
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_buffer(EXPIRY_BUFFER_SECS)
    }

    /// Check if the access token is expired with a custom buffer
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(buffer_seconds)
    }

    /// Usable as-is: an access token is present and not expired.
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    /// A refresh token is available.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    /// Whether every scope in `required` was granted.
    pub fn covers_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Get the time remaining until token expiration
    ///
    /// Returns `None` if the token is already expired.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        let now = Utc::now();
        if now >= self.expires_at {
            None
        } else {
            Some(self.expires_at - now)
        }
    }
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Where the session's credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// A still-valid cached credential
    Cache,
    /// A cached credential refreshed with its refresh token
    Refreshed,
    /// A new credential from the interactive consent flow
    Consent,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Cache => write!(f, "cached credential"),
            CredentialSource::Refreshed => write!(f, "refreshed credential"),
            CredentialSource::Consent => write!(f, "new consent"),
        }
    }
}

/// Authenticated session handle for the remote storage API.
///
/// Valid for the remainder of the process run.
#[derive(Clone)]
pub struct AuthenticatedSession {
    access_token: String,
    expires_at: DateTime<Utc>,
    source: CredentialSource,
}

impl AuthenticatedSession {
    pub fn new(tokens: &OAuthTokens, source: CredentialSource) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            expires_at: tokens.expires_at,
            source,
        }
    }

    /// Bearer token for API requests
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("source", &self.source)
            .finish()
    }
}
