//! `drive-provision`: authenticate against Google Drive and make sure the
//! configured folder tree exists.
//!
//! Exit codes:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | every folder is in place |
//! | 1 | configuration or other error |
//! | 2 | authentication failed |
//! | 3 | the root folder could not be resolved or created |
//! | 4 | the root exists but some subfolders are missing |

mod cli;

use anyhow::Context;
use bridge_desktop::{FileCredentialStore, ReqwestHttpClient};
use bridge_traits::{CredentialStore, HttpClient};
use clap::Parser;
use cli::Cli;
use core_auth::{
    AuthenticatedSession, Authenticator, BrowserLauncher, ClientSecret,
    LoopbackConsentFlow, OAuthFlowManager, PrintOnly, SystemBrowser, TokenStore, DRIVE_FILE_SCOPE,
};
use core_provision::{
    FolderSpec, ProvisionEvent, ProvisionObserver, ProvisionStatus, ProvisioningOrchestrator,
};
use core_runtime::config::{CredentialBackend, ProvisionConfig};
use core_runtime::logging::init_logging;
use provider_google_drive::GoogleDriveConnector;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_AUTH_FAILED: u8 = 2;
const EXIT_ROOT_FAILED: u8 = 3;
const EXIT_PARTIAL: u8 = 4;

/// Prints each provisioning step on stdout.
struct ConsoleObserver;

impl ProvisionObserver for ConsoleObserver {
    fn on_event(&self, event: &ProvisionEvent) {
        println!("{}", event);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.logging_config()) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = %e, "Provisioning aborted");
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = cli.provision_config().context("Invalid configuration")?;
    info!(
        root = %config.root_folder,
        subfolders = config.subfolders.len(),
        cache = %config.cache_format,
        "Starting provisioning"
    );

    let http: Arc<dyn HttpClient> = Arc::new(
        ReqwestHttpClient::with_timeout(config.http_timeout)
            .context("Failed to set up the HTTP client")?,
    );

    let session = match authenticate(&config, http.clone(), cli.reset_credentials).await? {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Authentication failed");
            eprintln!("Authentication failed: {}", e);
            return Ok(EXIT_AUTH_FAILED);
        }
    };
    println!("Authenticated using {}", session.source());

    let storage = Arc::new(GoogleDriveConnector::new(http, session.access_token()));
    let tree = FolderSpec::new(config.root_folder.clone()).with_children(config.subfolders.clone());

    let report = ProvisioningOrchestrator::new(storage)
        .with_observer(Arc::new(ConsoleObserver))
        .provision(&tree)
        .await;

    println!();
    print!("{}", report);
    println!("{}", report.summary());

    Ok(exit_code(report.status()))
}

fn exit_code(status: ProvisionStatus) -> u8 {
    match status {
        ProvisionStatus::Complete => EXIT_SUCCESS,
        ProvisionStatus::Partial => EXIT_PARTIAL,
        ProvisionStatus::RootFailed => EXIT_ROOT_FAILED,
    }
}

/// Wiring errors come back on the outer `Result`; authentication errors on
/// the inner one, so they can map to their own exit code.
async fn authenticate(
    config: &ProvisionConfig,
    http: Arc<dyn HttpClient>,
    reset: bool,
) -> anyhow::Result<core_auth::Result<AuthenticatedSession>> {
    let secret = match ClientSecret::load(&config.client_secret_path).await {
        Ok(secret) => secret,
        Err(e) => return Ok(Err(e)),
    };
    let oauth = OAuthFlowManager::new(
        secret.into_oauth_config(vec![DRIVE_FILE_SCOPE.to_string()]),
        http,
    );

    let token_store = TokenStore::new(credential_store(config)?, config.cache_format);

    let launcher: Arc<dyn BrowserLauncher> = if config.open_browser {
        Arc::new(SystemBrowser)
    } else {
        Arc::new(PrintOnly)
    };
    let consent = LoopbackConsentFlow::new(config.consent_timeout).with_launcher(launcher);

    let authenticator = Authenticator::new(oauth, token_store, Arc::new(consent));

    if reset {
        if let Err(e) = authenticator.forget_credentials().await {
            return Ok(Err(e));
        }
        info!("Cached credential discarded");
    }

    Ok(authenticator.authenticate().await)
}

fn credential_store(config: &ProvisionConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match config.credential_backend {
        CredentialBackend::File => Ok(Arc::new(FileCredentialStore::new(&config.token_cache_path))),
        CredentialBackend::Keyring => keyring_store(),
    }
}

#[cfg(feature = "keyring-store")]
fn keyring_store() -> anyhow::Result<Arc<dyn CredentialStore>> {
    Ok(Arc::new(bridge_desktop::KeyringCredentialStore::new()))
}

#[cfg(not(feature = "keyring-store"))]
fn keyring_store() -> anyhow::Result<Arc<dyn CredentialStore>> {
    anyhow::bail!("The keyring credential backend requires building with the `keyring-store` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(ProvisionStatus::Complete), 0);
        assert_eq!(exit_code(ProvisionStatus::RootFailed), 3);
        assert_eq!(exit_code(ProvisionStatus::Partial), 4);
        assert_eq!(EXIT_FAILURE, 1);
        assert_eq!(EXIT_AUTH_FAILED, 2);
    }

    #[tokio::test]
    async fn test_missing_client_secret_is_an_auth_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = Cli::try_parse_from([
            "drive-provision",
            "--client-secret",
            dir.path().join("absent.json").to_str().unwrap(),
            "--token-cache",
            dir.path().join("token.json").to_str().unwrap(),
            "--no-browser",
        ])
        .unwrap();

        let code = run(cli).await.unwrap();
        assert_eq!(code, EXIT_AUTH_FAILED);
    }
}
