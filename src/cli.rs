use clap::Parser;
use core_runtime::config::{
    CacheFormat, CredentialBackend, ProvisionConfig, DEFAULT_CLIENT_SECRET_PATH,
    DEFAULT_ROOT_FOLDER, DEFAULT_TOKEN_CACHE_PATH,
};
use core_runtime::logging::{LogFormat, LogLevel, LoggingConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Create a folder tree in Google Drive, reusing folders that already exist.
#[derive(Debug, Parser)]
#[command(name = "drive-provision", version, about)]
pub struct Cli {
    /// OAuth client-secret JSON for a desktop app client
    #[arg(long, env = "DRIVE_PROVISION_CLIENT_SECRET", default_value = DEFAULT_CLIENT_SECRET_PATH)]
    pub client_secret: PathBuf,

    /// Credential cache file
    #[arg(long, env = "DRIVE_PROVISION_TOKEN_CACHE", default_value = DEFAULT_TOKEN_CACHE_PATH)]
    pub token_cache: PathBuf,

    /// Credential cache encoding: json or binary
    #[arg(long, default_value = "json")]
    pub cache_format: CacheFormat,

    /// Where to keep the credential cache: file or keyring
    #[arg(long, default_value = "file")]
    pub credential_backend: CredentialBackend,

    /// Name of the top-level folder
    #[arg(long, default_value = DEFAULT_ROOT_FOLDER)]
    pub root: String,

    /// Subfolder to create under the root (repeatable)
    #[arg(long = "subfolder", value_name = "NAME")]
    pub subfolders: Vec<String>,

    /// Seconds to wait for the browser consent to complete
    #[arg(long, default_value_t = 300)]
    pub consent_timeout_secs: u64,

    /// Print the consent URL instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Discard the cached credential and ask for consent again
    #[arg(long)]
    pub reset_credentials: bool,

    /// Minimum log level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Log output: compact, pretty or json
    #[arg(long, default_value = "compact")]
    pub log_format: LogFormat,

    /// Custom log filter directives, overriding --log-level
    #[arg(long, env = "RUST_LOG")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn logging_config(&self) -> LoggingConfig {
        let config = LoggingConfig::default()
            .with_level(self.log_level)
            .with_format(self.log_format);

        match &self.log_filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }

    pub fn provision_config(&self) -> core_runtime::Result<ProvisionConfig> {
        let mut builder = ProvisionConfig::builder()
            .client_secret_path(&self.client_secret)
            .token_cache_path(&self.token_cache)
            .cache_format(self.cache_format)
            .credential_backend(self.credential_backend)
            .root_folder(&self.root)
            .consent_timeout(Duration::from_secs(self.consent_timeout_secs))
            .open_browser(!self.no_browser);

        if !self.subfolders.is_empty() {
            builder = builder.subfolders(&self.subfolders);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("drive-provision").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).provision_config().unwrap();

        assert_eq!(config.root_folder, "Research_Project");
        assert_eq!(config.subfolders, vec!["data", "models", "results"]);
        assert_eq!(config.cache_format, CacheFormat::Json);
        assert!(config.open_browser);
    }

    #[test]
    fn test_custom_tree() {
        let cli = parse(&[
            "--root",
            "Thesis",
            "--subfolder",
            "drafts",
            "--subfolder",
            "figures",
            "--cache-format",
            "binary",
            "--no-browser",
        ]);
        let config = cli.provision_config().unwrap();

        assert_eq!(config.root_folder, "Thesis");
        assert_eq!(config.subfolders, vec!["drafts", "figures"]);
        assert_eq!(config.cache_format, CacheFormat::Binary);
        assert!(!config.open_browser);
    }

    #[test]
    fn test_invalid_tree_is_rejected() {
        let cli = parse(&["--subfolder", "a/b"]);
        assert!(cli.provision_config().is_err());
    }

    #[test]
    fn test_unknown_cache_format_fails_to_parse() {
        let result = Cli::try_parse_from(["drive-provision", "--cache-format", "yaml"]);
        assert!(result.is_err());
    }
}
