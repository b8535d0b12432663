//! Language-model port

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::types::{ChatMessage, StreamChunk};

use super::error::ProviderResult;

/// Model selection and credentials for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderModelConfig {
    /// Model identifier as the backend names it
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

impl ProviderModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// Generation options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamChatOptions {
    /// 0.0 - 2.0
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop: Option<Vec<String>>,
}

impl StreamChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Streaming response: chunks in emission order, ending at the first error
pub type StreamResponse = Pin<Box<dyn Stream<Item = ProviderResult<StreamChunk>> + Send>>;

/// A language-model backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider id, e.g. "openai"
    fn name(&self) -> &str;

    /// Whether requests fail without an API key
    fn requires_api_key(&self) -> bool {
        true
    }

    /// Stream a reply to `messages`
    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
    ) -> ProviderResult<StreamResponse>;

    /// Non-streaming reply: the text chunks of [`Provider::stream_chat`]
    /// concatenated. Reasoning chunks are dropped.
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
    ) -> ProviderResult<String> {
        let mut stream = self.stream_chat(messages, model, options).await?;
        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            if let Some(text) = chunk?.as_text() {
                reply.push_str(text);
            }
        }
        Ok(reply)
    }
}
