//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Service id → environment variables, tried in order
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("groq", vec!["GROQ_API_KEY"]);
    m.insert("xai", vec!["XAI_API_KEY"]);
    m.insert("deepseek", vec!["DEEPSEEK_API_KEY"]);
    m.insert("mistral", vec!["MISTRAL_API_KEY"]);
    m.insert("azure", vec!["AZURE_API_KEY", "AZURE_OPENAI_API_KEY"]);
    m.insert("openrouter", vec!["OPENROUTER_API_KEY"]);
    m.insert("ollama", vec![]);
    m.insert("rijksmuseum", vec!["RIJKSMUSEUM_API_KEY"]);
    m
});

/// Reads secrets from the process environment. Read-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Environment variables consulted for a service id
    pub fn env_vars_for(service: &str) -> &'static [&'static str] {
        ENV_VAR_MAP
            .get(service.to_lowercase().as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        non_empty_var(key)
            .or_else(|| Self::env_vars_for(key).iter().find_map(|var| non_empty_var(var)))
            .or_else(|| non_empty_var(&format!("{}_API_KEY", key.to_uppercase())))
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly(self.name().to_string()))
    }

    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly(self.name().to_string()))
    }
}
