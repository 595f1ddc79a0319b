//! Installed-application client secret file
//!
//! Parses the JSON downloaded from the Google Cloud console for an OAuth
//! client of type "Desktop app" (`{"installed": {...}}`) or "Web application"
//! (`{"web": {...}}`).

use crate::error::{AuthError, Result};
use crate::oauth::{OAuthConfig, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL};
use core_runtime::logging::strip_path;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecretEntry>,
    web: Option<ClientSecretEntry>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretEntry {
    client_id: String,
    client_secret: Option<String>,
    #[serde(default = "default_auth_uri")]
    auth_uri: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

/// OAuth client identity of this application.
#[derive(Clone)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub auth_uri: String,
    pub token_uri: String,
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ClientSecret {
    /// Read and parse the client secret file.
    ///
    /// A missing file yields [`AuthError::ClientSecretMissing`], anything
    /// unparseable [`AuthError::ClientSecretInvalid`].
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AuthError::ClientSecretMissing {
                path: path.display().to_string(),
            },
            _ => AuthError::ClientSecretInvalid {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;

        let secret = Self::from_json(&data).map_err(|reason| AuthError::ClientSecretInvalid {
            path: path.display().to_string(),
            reason,
        })?;
        let display_path = path.to_string_lossy();
        debug!(
            file = strip_path(&display_path),
            client_id = %secret.client_id,
            "Loaded client secret"
        );
        Ok(secret)
    }

    /// Parse the client secret JSON. Errors are returned as a plain reason.
    pub fn from_json(data: &[u8]) -> std::result::Result<Self, String> {
        let file: ClientSecretFile =
            serde_json::from_slice(data).map_err(|e| format!("malformed JSON: {}", e))?;

        let entry = file
            .installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" client section".to_string())?;

        if entry.client_id.trim().is_empty() {
            return Err("client_id is empty".to_string());
        }

        Ok(Self {
            client_id: entry.client_id,
            client_secret: entry.client_secret.filter(|s| !s.is_empty()),
            auth_uri: entry.auth_uri,
            token_uri: entry.token_uri,
        })
    }

    /// OAuth configuration requesting the given scopes.
    pub fn into_oauth_config(self, scopes: Vec<String>) -> OAuthConfig {
        OAuthConfig {
            client_id: self.client_id,
            client_secret: self.client_secret,
            scopes,
            auth_url: self.auth_uri,
            token_url: self.token_uri,
        }
    }
}
