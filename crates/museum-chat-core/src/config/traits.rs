//! Configuration provider trait

use async_trait::async_trait;

use super::settings::AppConfig;

/// Source of the app configuration
///
/// Implementations:
/// - `MemoryConfigProvider`: in-memory, for tests and hosts that build config in code
/// - `FileConfigProvider`: YAML file under the user config directory
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Load the configuration; a missing source yields the defaults
    async fn load(&self) -> ConfigResult<AppConfig>;

    async fn save(&self, config: &AppConfig) -> ConfigResult<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown model provider '{0}'")]
    UnknownProvider(String),

    /// The selected backend needs a key and none was found. Fatal at startup.
    #[error("No API key configured for '{provider}'; set it in the config file or the environment")]
    MissingCredential { provider: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
