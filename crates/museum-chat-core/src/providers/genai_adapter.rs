//! Conversions between our chat types and genai's
//!
//! Credentials come from the request's explicit key or from a
//! [`SecretStore`], never from genai's own environment lookup.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use genai::chat::{ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatStreamEvent};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};

use crate::secrets::SecretStore;
use crate::types::{ChatMessage, MessageRole, StreamChunk};

use super::error::ProviderError;
use super::traits::StreamChatOptions;

/// Providers genai speaks natively
const NATIVE: &[&str] = &[
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
];

/// Providers reached through genai's OpenAI adapter
const OPENAI_COMPATIBLE: &[&str] = &["azure", "openrouter", "mistral"];

pub fn to_genai_message(msg: ChatMessage) -> GenaiMessage {
    match msg.role {
        MessageRole::System => GenaiMessage::system(msg.content),
        MessageRole::User => GenaiMessage::user(msg.content),
        MessageRole::Assistant => GenaiMessage::assistant(msg.content),
    }
}

pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().map(to_genai_message).collect()
}

pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }
    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }
    if let Some(stop) = &options.stop {
        genai_opts = genai_opts.with_stop_sequences(stop.clone());
    }

    genai_opts
}

/// Map a genai stream event to a chunk. Events without text are skipped.
pub fn from_genai_event(event: ChatStreamEvent) -> Option<Result<StreamChunk, ProviderError>> {
    match event {
        ChatStreamEvent::Chunk(chunk) => Some(Ok(StreamChunk::Text {
            text: chunk.content,
        })),
        ChatStreamEvent::ReasoningChunk(chunk) => Some(Ok(StreamChunk::Reasoning {
            text: chunk.content,
        })),
        ChatStreamEvent::Start
        | ChatStreamEvent::End(_)
        | ChatStreamEvent::ToolCallChunk(_)
        | ChatStreamEvent::ThoughtSignatureChunk(_) => None,
    }
}

pub fn is_genai_native(provider: &str) -> bool {
    NATIVE.contains(&provider.to_lowercase().as_str())
}

pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider) || OPENAI_COMPATIBLE.contains(&provider.to_lowercase().as_str())
}

/// Routing and credentials for one client
#[derive(Clone)]
pub struct ClientSettings {
    pub provider: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub secrets: Arc<dyn SecretStore>,
}

/// Build a genai client for one provider.
///
/// `api_base`, when set, overrides the endpoint of any provider; the
/// OpenAI-compatible ones fall back to their public endpoints.
pub fn create_client(settings: ClientSettings) -> Client {
    let auth_provider = settings.provider.clone();
    let auth_key = settings.api_key.clone();
    let secrets = settings.secrets.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = auth_key.clone().or_else(|| secrets.get(&auth_provider));
            Box::pin(async move { Ok(key.map(AuthData::from_single)) })
        },
    );

    let target_provider = settings.provider.to_lowercase();
    let target_api_base = settings.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let default_endpoint = match target_provider.as_str() {
                "azure" => Some("https://your-resource.openai.azure.com/"),
                "openrouter" => Some("https://openrouter.ai/api/v1/"),
                "mistral" => Some("https://api.mistral.ai/v1/"),
                _ => None,
            };

            let endpoint = match (&target_api_base, default_endpoint) {
                (Some(base), _) => Endpoint::from_owned(base.clone()),
                (None, Some(url)) => Endpoint::from_static(url),
                (None, None) => return Ok(target),
            };

            let model = if default_endpoint.is_some() {
                ModelIden::new(AdapterKind::OpenAI, target.model.model_name.clone())
            } else {
                target.model
            };

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}
