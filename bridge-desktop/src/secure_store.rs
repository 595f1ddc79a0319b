//! Credential cache in the OS keychain

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::{
    error::{BridgeError, Result},
    storage::CredentialStore,
};
use keyring::Entry;
use tracing::{debug, error};

const DEFAULT_SERVICE: &str = "drive-provision";
const DEFAULT_ACCOUNT: &str = "oauth-token";

/// Keyring-based credential store
///
/// Uses platform-specific secure storage:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
pub struct KeyringCredentialStore {
    service_name: String,
    account: String,
}

impl KeyringCredentialStore {
    /// Create a store with the default service and account names
    pub fn new() -> Self {
        Self::with_names(DEFAULT_SERVICE, DEFAULT_ACCOUNT)
    }

    /// Create a store under a custom service/account pair
    pub fn with_names(service_name: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service_name, &self.account).map_err(Self::map_keyring_error)
    }

    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        BridgeError::OperationFailed(format!("Keyring error: {}", e))
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match self.entry()?.get_password() {
            Ok(encoded) => {
                let decoded = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                    error!(service = %self.service_name, error = %e, "Failed to decode keyring entry");
                    BridgeError::OperationFailed(format!("Failed to decode keyring entry: {}", e))
                })?;
                debug!(service = %self.service_name, "Loaded credential from keyring");
                Ok(Some(decoded))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service_name, "No credential in keyring");
                Ok(None)
            }
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    async fn save(&self, data: &[u8]) -> Result<()> {
        // Keyring only stores strings
        let encoded = STANDARD.encode(data);
        self.entry()?
            .set_password(&encoded)
            .map_err(Self::map_keyring_error)?;

        debug!(service = %self.service_name, "Stored credential in keyring");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    fn describe(&self) -> String {
        format!("keyring {}/{}", self.service_name, self.account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let store = KeyringCredentialStore::new();
        assert_eq!(store.service_name, "drive-provision");
        assert_eq!(store.describe(), "keyring drive-provision/oauth-token");
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        // Keyring is often unavailable on headless CI hosts.
        let store = KeyringCredentialStore::with_names("drive-provision-test", "roundtrip");
        let _ = store.clear().await;

        match store.save(b"{\"token\":1}").await {
            Ok(()) => {
                if let Ok(Some(loaded)) = store.load().await {
                    assert_eq!(loaded, b"{\"token\":1}".to_vec());
                }
                let _ = store.clear().await;
            }
            Err(e) => println!("Keyring not available ({}), skipping test", e),
        }
    }
}
