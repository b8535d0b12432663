//! Scripted model backend for tests and offline demos

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;

use crate::logging::Logger;
use crate::types::{ChatMessage, MessageRole, StreamChunk};

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

/// What the mock streams back
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// "Echo: <last user message>"
    #[default]
    Echo,
    Fixed(String),
    /// These chunks, unsplit
    Chunks(Vec<String>),
    /// `after` chunks of text, then an error
    Error { message: String, after: Vec<String> },
    Empty,
}

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub mode: MockMode,
    /// Pause between chunks (0 = none)
    pub chunk_delay_ms: u64,
    /// Split size for echo and fixed replies (0 = one chunk)
    pub chunk_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mode: MockMode::Echo,
            chunk_delay_ms: 0,
            chunk_size: 10,
        }
    }
}

/// Mock provider. Remembers the messages of the last request.
pub struct MockProvider {
    config: MockConfig,
    last_request: Mutex<Option<Vec<ChatMessage>>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    pub fn with_config(config: MockConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            last_request: Mutex::new(None),
            logger,
        }
    }

    fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode,
                ..Default::default()
            },
            logger,
        )
    }

    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    pub fn chunked<I, S>(chunks: I, logger: Arc<dyn Logger>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(MockMode::Chunks(chunks.into_iter().map(Into::into).collect()), logger)
    }

    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(
            MockMode::Error {
                message: message.into(),
                after: Vec::new(),
            },
            logger,
        )
    }

    /// Stream `chunks`, then fail with `message`
    pub fn error_after<I, S>(chunks: I, message: impl Into<String>, logger: Arc<dyn Logger>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(
            MockMode::Error {
                message: message.into(),
                after: chunks.into_iter().map(Into::into).collect(),
            },
            logger,
        )
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.chunk_delay_ms = delay_ms;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Messages of the most recent `stream_chat` call
    pub fn last_request(&self) -> Option<Vec<ChatMessage>> {
        self.last_request.lock().clone()
    }

    fn last_user_message(messages: &[ChatMessage]) -> &str {
        messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User && !m.content.is_empty())
            .map_or("Hello from MockProvider!", |m| m.content.as_str())
    }

    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if self.config.chunk_size == 0 || text.is_empty() {
            return vec![text.to_string()];
        }

        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.config.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        _options: StreamChatOptions,
    ) -> ProviderResult<StreamResponse> {
        self.logger.debug(&format!("[MockProvider] stream_chat with {} messages", messages.len()));

        let mut items: Vec<ProviderResult<String>> = match &self.config.mode {
            MockMode::Echo => self
                .split_into_chunks(&format!("Echo: {}", Self::last_user_message(&messages)))
                .into_iter()
                .map(Ok)
                .collect(),
            MockMode::Fixed(response) => self.split_into_chunks(response).into_iter().map(Ok).collect(),
            MockMode::Chunks(chunks) => chunks.iter().cloned().map(Ok).collect(),
            MockMode::Empty => Vec::new(),
            MockMode::Error { after, .. } => after.iter().cloned().map(Ok).collect(),
        };
        if let MockMode::Error { message, .. } = &self.config.mode {
            items.push(Err(ProviderError::Other(format!("Mock error: {}", message))));
        }

        *self.last_request.lock() = Some(messages);

        let delay_ms = self.config.chunk_delay_ms;
        let stream = stream::iter(items.into_iter().enumerate()).then(move |(i, item)| async move {
            if i > 0 && delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            item.map(StreamChunk::text)
        });

        Ok(Box::pin(stream))
    }
}
