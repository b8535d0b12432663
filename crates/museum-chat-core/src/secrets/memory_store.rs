//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreResult};

/// Read-write store kept in memory, for tests and hosts that pass
/// credentials in directly
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(self, key: &str, value: &str) -> Self {
        self.secrets.write().insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets.read().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.secrets.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        self.secrets.write().remove(key);
        Ok(())
    }
}
