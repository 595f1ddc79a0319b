//! Integration tests for logging and configuration

use core_runtime::config::{CacheFormat, CredentialBackend, ProvisionConfig};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LogLevel, LoggingConfig,
};
use core_runtime::Error;

#[test]
fn test_logging_initializes_once() {
    // The global subscriber can only be installed once per process
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_ansi(false);

    assert!(init_logging(config.clone()).is_ok());
    assert!(matches!(init_logging(config), Err(Error::Logging(_))));

    tracing::info!(folder = "data", "Logging is live");
}

#[test]
fn test_oauth_values_are_redacted() {
    assert_eq!(redact_if_sensitive("access_token", "ya29.a0Af"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("refresh_token", "1//0g"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("code", "4/0AX4"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("client_secret", "GOCSPX-"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("code_verifier", "abc"), "[REDACTED]");
}

#[test]
fn test_account_email_is_masked() {
    let redacted = redact_if_sensitive("account", "researcher@example.com");

    assert!(redacted.starts_with('r'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_folder_values_pass_through() {
    assert_eq!(redact_if_sensitive("folder", "Research_Project"), "Research_Project");
    assert_eq!(redact_if_sensitive("folder_id", "1AbCdEf"), "1AbCdEf");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/home/user/.config/drive/token.json"), "token.json");
    assert_eq!(strip_path("C:\\Users\\me\\credentials.json"), "credentials.json");
    assert_eq!(strip_path("credentials.json"), "credentials.json");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_config_defaults_match_cli_defaults() {
    let config = ProvisionConfig::builder().build().unwrap();

    assert_eq!(config.client_secret_path.to_str(), Some("credentials.json"));
    assert_eq!(config.token_cache_path.to_str(), Some("token.json"));
    assert_eq!(config.cache_format, CacheFormat::Json);
    assert_eq!(config.credential_backend, CredentialBackend::File);
    assert_eq!(config.root_folder, "Research_Project");
    assert_eq!(config.subfolders, vec!["data", "models", "results"]);
}

#[test]
fn test_config_rejects_bad_tree() {
    let err = ProvisionConfig::builder()
        .root_folder("  ")
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("Root folder name cannot be empty"));

    let err = ProvisionConfig::builder()
        .subfolders(["data", "data"])
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("more than once"));
}
