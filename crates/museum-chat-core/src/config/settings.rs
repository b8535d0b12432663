//! Configuration model
//!
//! ```yaml
//! llm:
//!   provider: anthropic
//!   model: claude-3-5-haiku-latest
//!   temperature: 0.7
//! mcp:
//!   transport: stdio
//!   command: npx
//!   args: ["-y", "mcp-server-rijksmuseum"]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::providers::{supported_providers, ProviderModelConfig, StreamChatOptions};
use crate::secrets::SecretStore;

use super::traits::{ConfigError, ConfigResult};

/// Overrides the configured provider id
pub const PROVIDER_ENV: &str = "MUSEUM_CHAT_PROVIDER";
/// Overrides the configured model
pub const MODEL_ENV: &str = "MUSEUM_CHAT_MODEL";
/// Secret store key of the collection API key
pub const COLLECTION_SECRET: &str = "rijksmuseum";
/// Environment variable the collection server reads its key from
pub const COLLECTION_KEY_ENV: &str = "RIJKSMUSEUM_API_KEY";

/// Providers that work without an API key
const KEYLESS: &[&str] = &["ollama", "mock"];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub mcp: McpSettings,
}

impl AppConfig {
    /// Apply `MUSEUM_CHAT_PROVIDER` / `MUSEUM_CHAT_MODEL`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(provider) = value(PROVIDER_ENV) {
            self.llm.provider = provider.trim().to_lowercase();
        }
        if let Some(model) = value(MODEL_ENV) {
            self.llm.model = model.trim().to_string();
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.llm.validate()?;
        self.mcp.validate()
    }
}

/// Model backend selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// One of [`supported_providers`]
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_base: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl LlmSettings {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let provider = self.provider.to_lowercase();
        if !supported_providers().contains(&provider.as_str()) {
            return Err(ConfigError::UnknownProvider(self.provider.clone()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }
        if provider == "azure" && self.api_base.is_none() {
            return Err(ConfigError::Invalid("azure requires llm.api_base".to_string()));
        }
        Ok(())
    }

    pub fn requires_api_key(&self) -> bool {
        !KEYLESS.contains(&self.provider.to_lowercase().as_str())
    }

    /// Settle the model and its credentials.
    ///
    /// The key in the file wins; otherwise the secret store is asked by
    /// provider id.
    pub fn resolve(&self, secrets: &dyn SecretStore) -> ConfigResult<ProviderModelConfig> {
        self.validate()?;

        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| secrets.get(&self.provider.to_lowercase()));

        if api_key.is_none() && self.requires_api_key() {
            return Err(ConfigError::MissingCredential {
                provider: self.provider.clone(),
            });
        }

        Ok(ProviderModelConfig {
            model: self.model.clone(),
            api_key,
            api_base: self.api_base.clone(),
        })
    }

    pub fn options(&self) -> StreamChatOptions {
        StreamChatOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransportKind {
    /// Spawn the server as a child process
    #[default]
    Stdio,
    /// Streamable HTTP
    Http,
    /// Unix domain socket
    Unix,
}

/// How to reach the collection server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpSettings {
    pub transport: McpTransportKind,
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the child process
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<String>,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            transport: McpTransportKind::Stdio,
            command: "npx".to_string(),
            args: vec!["-y".to_string(), "mcp-server-rijksmuseum".to_string()],
            env: BTreeMap::new(),
            url: None,
            socket_path: None,
        }
    }
}

impl McpSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        match self.transport {
            McpTransportKind::Stdio if self.command.trim().is_empty() => {
                Err(ConfigError::Invalid("mcp.command is required for stdio".to_string()))
            }
            McpTransportKind::Http if self.url.is_none() => {
                Err(ConfigError::Invalid("mcp.url is required for http".to_string()))
            }
            McpTransportKind::Unix if self.socket_path.is_none() => {
                Err(ConfigError::Invalid("mcp.socket_path is required for unix".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Child environment with the collection key filled in from the secret
    /// store when the file does not set it
    pub fn resolved_env(&self, secrets: &dyn SecretStore) -> BTreeMap<String, String> {
        let mut env = self.env.clone();
        if !env.contains_key(COLLECTION_KEY_ENV) {
            if let Some(key) = secrets.get(COLLECTION_SECRET) {
                env.insert(COLLECTION_KEY_ENV.to_string(), key);
            }
        }
        env
    }
}
