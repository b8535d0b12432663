//! Language-model backends
//!
//! Everything except the mock goes through the `genai` crate, which handles
//! streaming and the provider protocols. Azure, OpenRouter and Mistral use
//! genai's OpenAI adapter with a resolved endpoint.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};
pub use genai_provider::GenaiProvider;
pub use genai_adapter::{is_genai_native, is_genai_supported};
pub use mock::{MockConfig, MockMode, MockProvider};

use std::sync::Arc;

use crate::logging::Logger;
use crate::secrets::SecretStore;

/// Create the provider for a provider id.
///
/// Unknown ids are rejected rather than guessed at.
pub fn create_provider(
    provider_id: &str,
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
) -> ProviderResult<Arc<dyn Provider>> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockProvider::echo(logger))),
        id if GenaiProvider::supports(id) => Ok(Arc::new(GenaiProvider::with_secrets(id, secrets, logger))),
        _ => Err(ProviderError::UnknownProvider(provider_id.to_string())),
    }
}

/// Every provider id accepted by [`create_provider`]
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        "openai",
        "anthropic",
        "gemini",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        "azure",
        "openrouter",
        "mistral",
        "mock",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_create_provider() {
        let secrets: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::new());
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);

        for id in supported_providers() {
            let provider = create_provider(id, secrets.clone(), logger.clone()).unwrap();
            assert_eq!(provider.name(), id);
        }

        let err = create_provider("redhat", secrets, logger).err().unwrap();
        assert!(matches!(err, ProviderError::UnknownProvider(ref id) if id == "redhat"));
    }
}
