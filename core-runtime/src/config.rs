//! # Provisioning Configuration
//!
//! Provides configuration management for the provisioning tool.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`ProvisionConfig`]. Every unset field falls back to the defaults the tool
//! has always used (`credentials.json`, `token.json`, `Research_Project` with
//! `data`, `models` and `results`), and [`ProvisionConfigBuilder::build`]
//! validates the result before anything touches the network.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::ProvisionConfig;
//!
//! let config = ProvisionConfig::builder()
//!     .client_secret_path("secrets/credentials.json")
//!     .root_folder("Thesis")
//!     .subfolders(["drafts", "figures"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.subfolders.len(), 2);
//! ```
//!
//! ## Error Handling
//!
//! Invalid values produce [`Error::Config`] with an actionable message:
//!
//! ```should_panic
//! use core_runtime::config::ProvisionConfig;
//!
//! let config = ProvisionConfig::builder()
//!     .subfolders(["data", "data"])
//!     .build()
//!     .expect("Should fail - duplicate subfolder names");
//! ```

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default location of the OAuth client-secret file
pub const DEFAULT_CLIENT_SECRET_PATH: &str = "credentials.json";

/// Default location of the credential cache
pub const DEFAULT_TOKEN_CACHE_PATH: &str = "token.json";

/// Default name of the root folder
pub const DEFAULT_ROOT_FOLDER: &str = "Research_Project";

/// Default subfolders created under the root, in creation order
pub const DEFAULT_SUBFOLDERS: [&str; 3] = ["data", "models", "results"];

/// How long to wait for the user to finish the consent screen
pub const DEFAULT_CONSENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Per-request HTTP timeout
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Serialization used for the credential cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheFormat {
    /// Human-readable JSON document
    #[default]
    Json,
    /// Compact binary encoding
    Binary,
}

impl FromStr for CacheFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(CacheFormat::Json),
            "binary" | "bin" => Ok(CacheFormat::Binary),
            other => Err(format!("unknown cache format '{}' (expected json or binary)", other)),
        }
    }
}

impl fmt::Display for CacheFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheFormat::Json => f.write_str("json"),
            CacheFormat::Binary => f.write_str("binary"),
        }
    }
}

/// Where the credential cache lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialBackend {
    /// A file at `token_cache_path`
    #[default]
    File,
    /// The OS keychain
    Keyring,
}

impl FromStr for CredentialBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(CredentialBackend::File),
            "keyring" | "keychain" => Ok(CredentialBackend::Keyring),
            other => Err(format!(
                "unknown credential backend '{}' (expected file or keyring)",
                other
            )),
        }
    }
}

/// Validated configuration for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// OAuth client-secret JSON downloaded from the cloud console
    pub client_secret_path: PathBuf,

    /// Credential cache location (file backend)
    pub token_cache_path: PathBuf,

    /// Credential cache serialization
    pub cache_format: CacheFormat,

    /// Credential cache backend
    pub credential_backend: CredentialBackend,

    /// Root folder name
    pub root_folder: String,

    /// Subfolder names, created in this order
    pub subfolders: Vec<String>,

    /// Maximum wait for the consent redirect
    pub consent_timeout: Duration,

    /// Launch the system browser for consent
    pub open_browser: bool,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            client_secret_path: PathBuf::from(DEFAULT_CLIENT_SECRET_PATH),
            token_cache_path: PathBuf::from(DEFAULT_TOKEN_CACHE_PATH),
            cache_format: CacheFormat::default(),
            credential_backend: CredentialBackend::default(),
            root_folder: DEFAULT_ROOT_FOLDER.to_string(),
            subfolders: DEFAULT_SUBFOLDERS.iter().map(|s| s.to_string()).collect(),
            consent_timeout: DEFAULT_CONSENT_TIMEOUT,
            open_browser: true,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl ProvisionConfig {
    /// Creates a new builder for constructing a `ProvisionConfig`.
    pub fn builder() -> ProvisionConfigBuilder {
        ProvisionConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Paths are not empty
    /// - Folder names are non-empty, contain no `/`, and subfolders are unique
    /// - Timeouts are non-zero
    pub fn validate(&self) -> Result<()> {
        if self.client_secret_path.as_os_str().is_empty() {
            return Err(Error::Config(
                "Client secret path cannot be empty".to_string(),
            ));
        }

        if self.credential_backend == CredentialBackend::File
            && self.token_cache_path.as_os_str().is_empty()
        {
            return Err(Error::Config(
                "Token cache path cannot be empty when using the file credential backend"
                    .to_string(),
            ));
        }

        validate_folder_name("Root folder", &self.root_folder)?;

        if self.subfolders.is_empty() {
            return Err(Error::Config(
                "At least one subfolder is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.subfolders {
            validate_folder_name("Subfolder", name)?;
            if !seen.insert(name.as_str()) {
                return Err(Error::Config(format!(
                    "Subfolder '{}' is listed more than once",
                    name
                )));
            }
        }

        if self.consent_timeout.is_zero() {
            return Err(Error::Config(
                "Consent timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.http_timeout.is_zero() {
            return Err(Error::Config(
                "HTTP timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_folder_name(what: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Config(format!("{} name cannot be empty", what)));
    }
    if name.contains('/') {
        return Err(Error::Config(format!(
            "{} name '{}' must not contain '/'; nested paths are not supported",
            what, name
        )));
    }
    Ok(())
}

/// Builder for constructing [`ProvisionConfig`] instances.
#[derive(Debug, Default)]
pub struct ProvisionConfigBuilder {
    client_secret_path: Option<PathBuf>,
    token_cache_path: Option<PathBuf>,
    cache_format: Option<CacheFormat>,
    credential_backend: Option<CredentialBackend>,
    root_folder: Option<String>,
    subfolders: Option<Vec<String>>,
    consent_timeout: Option<Duration>,
    open_browser: Option<bool>,
    http_timeout: Option<Duration>,
}

impl ProvisionConfigBuilder {
    /// Sets the OAuth client-secret file path.
    pub fn client_secret_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.client_secret_path = Some(path.into());
        self
    }

    /// Sets the credential cache path.
    pub fn token_cache_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.token_cache_path = Some(path.into());
        self
    }

    pub fn cache_format(mut self, format: CacheFormat) -> Self {
        self.cache_format = Some(format);
        self
    }

    pub fn credential_backend(mut self, backend: CredentialBackend) -> Self {
        self.credential_backend = Some(backend);
        self
    }

    /// Sets the root folder name.
    pub fn root_folder(mut self, name: impl Into<String>) -> Self {
        self.root_folder = Some(name.into());
        self
    }

    /// Replaces the subfolder list.
    pub fn subfolders<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subfolders = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn consent_timeout(mut self, timeout: Duration) -> Self {
        self.consent_timeout = Some(timeout);
        self
    }

    pub fn open_browser(mut self, open: bool) -> Self {
        self.open_browser = Some(open);
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any value fails [`ProvisionConfig::validate`].
    pub fn build(self) -> Result<ProvisionConfig> {
        let defaults = ProvisionConfig::default();

        let config = ProvisionConfig {
            client_secret_path: self
                .client_secret_path
                .unwrap_or(defaults.client_secret_path),
            token_cache_path: self.token_cache_path.unwrap_or(defaults.token_cache_path),
            cache_format: self.cache_format.unwrap_or(defaults.cache_format),
            credential_backend: self
                .credential_backend
                .unwrap_or(defaults.credential_backend),
            root_folder: self.root_folder.unwrap_or(defaults.root_folder),
            subfolders: self.subfolders.unwrap_or(defaults.subfolders),
            consent_timeout: self.consent_timeout.unwrap_or(defaults.consent_timeout),
            open_browser: self.open_browser.unwrap_or(defaults.open_browser),
            http_timeout: self.http_timeout.unwrap_or(defaults.http_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_research_layout() {
        let config = ProvisionConfig::builder().build().unwrap();

        assert_eq!(config.client_secret_path, PathBuf::from("credentials.json"));
        assert_eq!(config.token_cache_path, PathBuf::from("token.json"));
        assert_eq!(config.root_folder, "Research_Project");
        assert_eq!(config.subfolders, vec!["data", "models", "results"]);
        assert_eq!(config.cache_format, CacheFormat::Json);
        assert_eq!(config.credential_backend, CredentialBackend::File);
        assert!(config.open_browser);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ProvisionConfig::builder()
            .client_secret_path("/etc/app/secret.json")
            .token_cache_path("/tmp/token.bin")
            .cache_format(CacheFormat::Binary)
            .root_folder("Thesis")
            .subfolders(["drafts"])
            .consent_timeout(Duration::from_secs(30))
            .open_browser(false)
            .build()
            .unwrap();

        assert_eq!(config.root_folder, "Thesis");
        assert_eq!(config.subfolders, vec!["drafts"]);
        assert_eq!(config.cache_format, CacheFormat::Binary);
        assert_eq!(config.consent_timeout, Duration::from_secs(30));
        assert!(!config.open_browser);
    }

    #[test]
    fn test_rejects_empty_root() {
        let err = ProvisionConfig::builder().root_folder("  ").build().unwrap_err();
        assert!(err.to_string().contains("Root folder name cannot be empty"));
    }

    #[test]
    fn test_rejects_nested_names() {
        let err = ProvisionConfig::builder()
            .subfolders(["data/raw"])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must not contain '/'"));
    }

    #[test]
    fn test_rejects_duplicate_subfolders() {
        let err = ProvisionConfig::builder()
            .subfolders(["data", "models", "data"])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'data' is listed more than once"));
    }

    #[test]
    fn test_subfolder_names_are_case_sensitive() {
        let config = ProvisionConfig::builder()
            .subfolders(["Data", "data"])
            .build()
            .unwrap();
        assert_eq!(config.subfolders.len(), 2);
    }

    #[test]
    fn test_rejects_empty_subfolder_list() {
        let err = ProvisionConfig::builder()
            .subfolders(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        assert!(ProvisionConfig::builder()
            .consent_timeout(Duration::ZERO)
            .build()
            .is_err());
        assert!(ProvisionConfig::builder()
            .http_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_keyring_backend_ignores_cache_path() {
        let config = ProvisionConfig::builder()
            .credential_backend(CredentialBackend::Keyring)
            .token_cache_path("")
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("binary".parse::<CacheFormat>(), Ok(CacheFormat::Binary));
        assert_eq!("JSON".parse::<CacheFormat>(), Ok(CacheFormat::Json));
        assert!("yaml".parse::<CacheFormat>().is_err());

        assert_eq!(
            "keyring".parse::<CredentialBackend>(),
            Ok(CredentialBackend::Keyring)
        );
        assert!("vault".parse::<CredentialBackend>().is_err());
    }
}
