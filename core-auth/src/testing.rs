use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::CredentialStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory credential store that records writes.
#[derive(Default)]
pub struct MemoryCredentialStore {
    contents: Mutex<Option<Vec<u8>>>,
    saves: AtomicUsize,
    failing: bool,
}

impl MemoryCredentialStore {
    pub fn with_contents(data: Vec<u8>) -> Self {
        Self {
            contents: Mutex::new(Some(data)),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(BridgeError::OperationFailed("disk full".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        self.check()?;
        Ok(self.contents())
    }

    async fn save(&self, data: &[u8]) -> Result<()> {
        self.check()?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.contents.lock().unwrap() = Some(data.to_vec());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check()?;
        *self.contents.lock().unwrap() = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
