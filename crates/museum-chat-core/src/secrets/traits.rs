//! Secret store trait

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Secret store '{0}' is read-only")]
    ReadOnly(String),

    #[error("Secret store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Source of credentials for model backends and the collection server.
///
/// Keys are either a service id (`openai`, `rijksmuseum`), which the store
/// maps to its own naming, or a literal name such as `OPENAI_API_KEY`.
pub trait SecretStore: Send + Sync {
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<String>;

    /// Write a secret. Read-only stores return [`SecretStoreError::ReadOnly`].
    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    fn delete(&self, key: &str) -> SecretStoreResult<()>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
