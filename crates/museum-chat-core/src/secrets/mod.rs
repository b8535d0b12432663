//! Credential lookup
//!
//! Model backends and the collection server read their keys through a
//! [`SecretStore`]. Hosts normally use [`EnvSecretStore`]; tests use
//! [`MemorySecretStore`].

mod traits;
mod env_store;
mod memory_store;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
