//! Model backends reached through the genai crate

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::ChatRequest;

use crate::logging::Logger;
use crate::secrets::{EnvSecretStore, SecretStore};
use crate::types::ChatMessage;

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_event, is_genai_supported, to_genai_messages, to_genai_options,
    ClientSettings,
};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

/// Any provider genai supports, natively or through its OpenAI adapter
pub struct GenaiProvider {
    provider_id: String,
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Provider that looks keys up in the environment when the request has none
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_secrets(provider_id, Arc::new(EnvSecretStore::new()), logger)
    }

    pub fn with_secrets(
        provider_id: impl Into<String>,
        secrets: Arc<dyn SecretStore>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider_id: provider_id.into().to_lowercase(),
            secrets,
            logger,
        }
    }

    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// "openai/gpt-4o" → "gpt-4o"
    pub fn extract_model_name(model: &str) -> &str {
        model.split_once('/').map_or(model, |(_, name)| name)
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    fn requires_api_key(&self) -> bool {
        self.provider_id != "ollama"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: StreamChatOptions,
    ) -> ProviderResult<StreamResponse> {
        let model_name = Self::extract_model_name(&model_config.model).to_string();
        self.logger.info(&format!(
            "[GenaiProvider] Streaming {} messages to {}/{}",
            messages.len(),
            self.provider_id,
            model_name
        ));

        let client = create_client(ClientSettings {
            provider: self.provider_id.clone(),
            api_key: model_config.api_key,
            api_base: model_config.api_base,
            secrets: self.secrets.clone(),
        });

        let request = ChatRequest::new(to_genai_messages(messages));
        let genai_options = to_genai_options(&options);

        let chat_stream = client
            .exec_chat_stream(&model_name, request, Some(&genai_options))
            .await
            .map_err(|e| ProviderError::api_error(&self.provider_id, 500, e.to_string()))?;

        let logger = Arc::clone(&self.logger);
        let provider_id = self.provider_id.clone();

        let stream = chat_stream.stream.filter_map(move |result| {
            let logger = Arc::clone(&logger);
            let provider_id = provider_id.clone();

            async move {
                match result {
                    Ok(event) => from_genai_event(event),
                    Err(e) => {
                        logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                        Some(Err(ProviderError::api_error(provider_id, 500, e.to_string())))
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
