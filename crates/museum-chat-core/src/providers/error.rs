//! Model backend error types

use thiserror::Error;

/// Errors from the language-model port. Stream errors reach the user as
/// chat-error events verbatim.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    #[error("Unknown model provider '{0}'")]
    UnknownProvider(String),

    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
