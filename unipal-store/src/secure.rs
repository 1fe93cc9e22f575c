//! Secure credential storage over the system keychain.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;

const STUDENT_ID_KEY: &str = "student_id";
const PASSWORD_KEY: &str = "password";

/// Named secret storage. The production implementation is the system
/// keychain; tests substitute memory.
#[async_trait]
pub trait CredentialStorage: Send + Sync {
    /// Reads a secret, `None` when absent.
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError>;
    /// Writes a secret.
    async fn set(&self, name: &str, value: &str) -> Result<(), StoreError>;
    /// Deletes a secret; deleting an absent secret is not an error.
    async fn remove(&self, name: &str) -> Result<(), StoreError>;
}

/// System keychain storage under a fixed service name.
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    /// Creates storage under the given keychain service name.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, name: &str) -> Result<keyring::Entry, StoreError> {
        Ok(keyring::Entry::new(&self.service, name)?)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new("app.unipal.sync")
    }
}

#[async_trait]
impl CredentialStorage for KeyringStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        match self.entry(name)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.entry(name)?.set_password(value)?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        match self.entry(name)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Memory-backed secrets for tests.
#[derive(Default)]
pub struct MemoryCredentialStorage {
    secrets: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[async_trait]
impl CredentialStorage for MemoryCredentialStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.secrets.lock().unwrap().get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.secrets
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.secrets.lock().unwrap().remove(name);
        Ok(())
    }
}

/// Student-ID/password pair storage.
pub struct SecureCredentialStore {
    storage: Arc<dyn CredentialStorage>,
}

impl SecureCredentialStore {
    /// Creates the store over a credential storage.
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        Self { storage }
    }

    /// The stored student ID, if any.
    pub async fn student_id(&self) -> Result<Option<String>, StoreError> {
        self.storage.get(STUDENT_ID_KEY).await
    }

    /// The stored password, if any.
    pub async fn password(&self) -> Result<Option<String>, StoreError> {
        self.storage.get(PASSWORD_KEY).await
    }

    /// Persists both halves of the credential pair.
    pub async fn save(&self, student_id: &str, password: &str) -> Result<(), StoreError> {
        self.storage.set(STUDENT_ID_KEY, student_id).await?;
        self.storage.set(PASSWORD_KEY, password).await?;
        debug!("Credentials persisted");
        Ok(())
    }

    /// Removes both halves of the credential pair.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove(STUDENT_ID_KEY).await?;
        self.storage.remove(PASSWORD_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_clear_pair() {
        let store = SecureCredentialStore::new(Arc::new(MemoryCredentialStorage::default()));
        assert!(store.student_id().await.unwrap().is_none());

        store.save("t123456", "pw").await.unwrap();
        assert_eq!(store.student_id().await.unwrap().unwrap(), "t123456");
        assert_eq!(store.password().await.unwrap().unwrap(), "pw");

        store.clear().await.unwrap();
        assert!(store.student_id().await.unwrap().is_none());
        assert!(store.password().await.unwrap().is_none());
    }
}
