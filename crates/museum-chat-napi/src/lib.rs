//! Node.js bindings for the museum chat desktop shell via napi-rs
//!
//! The renderer talks to a single `MuseumChat` instance. Commands return
//! presentation events as plain JSON objects tagged with `type`
//! (`artwork-list`, `artwork-details`, `chat-token`, `chat-complete`,
//! `chat-error`).

#![deny(clippy::all)]

use napi::bindgen_prelude::*;
use napi::threadsafe_function::{ThreadsafeFunction, ThreadsafeFunctionCallMode};
use napi_derive::napi;
use std::sync::Arc;
use tokio::sync::Mutex;

use museum_chat_core::config::{AppConfig, ConfigProvider, FileConfigProvider};
use museum_chat_core::logging::{ConsoleLogger, Logger, NoOpLogger};
use museum_chat_core::{
    supported_providers as core_supported_providers, ChatMessage as CoreChatMessage,
    EnvSecretStore, MessageRole as CoreMessageRole, MuseumSession, SystemOpener,
    ToolDescriptor as CoreToolDescriptor, UiEvent,
};

fn to_napi_error(e: impl std::fmt::Display) -> Error {
    Error::from_reason(e.to_string())
}

// ============================================================================
// Plain objects
// ============================================================================

#[napi(object)]
pub struct ConnectOptions {
    /// Path of a YAML config file; defaults to the user config file
    pub config_path: Option<String>,
    /// Overrides `llm.provider`
    pub provider: Option<String>,
    /// Overrides `llm.model`
    pub model: Option<String>,
    /// Log to the console (debug output included when true)
    pub verbose: Option<bool>,
}

#[napi(object)]
pub struct ToolInfo {
    pub name: String,
    pub description: Option<String>,
}

impl From<CoreToolDescriptor> for ToolInfo {
    fn from(tool: CoreToolDescriptor) -> Self {
        Self {
            name: tool.name,
            description: tool.description,
        }
    }
}

#[napi(string_enum)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl From<CoreMessageRole> for MessageRole {
    fn from(role: CoreMessageRole) -> Self {
        match role {
            CoreMessageRole::System => MessageRole::System,
            CoreMessageRole::User => MessageRole::User,
            CoreMessageRole::Assistant => MessageRole::Assistant,
        }
    }
}

#[napi(object)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

impl From<&CoreChatMessage> for ChatTurn {
    fn from(message: &CoreChatMessage) -> Self {
        Self {
            role: message.role.into(),
            content: message.content.clone(),
        }
    }
}

// ============================================================================
// MuseumChat
// ============================================================================

/// A connected chat session.
///
/// Calls are serialized: a second `sendChatMessage` waits for the first to
/// finish streaming.
#[napi]
pub struct MuseumChat {
    inner: Arc<Mutex<MuseumSession>>,
}

#[napi]
impl MuseumChat {
    /// Search the collection. Resolves to an `artwork-list` event.
    #[napi(ts_return_type = "Promise<{ type: 'artwork-list', artworks: any[] }>")]
    pub async fn search(&self, query: String) -> Result<serde_json::Value> {
        let mut session = self.inner.lock().await;
        let artworks = session.search(&query).await.map_err(to_napi_error)?;
        Ok(UiEvent::ArtworkList { artworks }.to_json())
    }

    /// Fetch one object. Resolves to an `artwork-details` event.
    #[napi(ts_return_type = "Promise<{ type: 'artwork-details', details: any }>")]
    pub async fn get_details(&self, object_number: String) -> Result<serde_json::Value> {
        let mut session = self.inner.lock().await;
        let details = session
            .get_details(&object_number)
            .await
            .map_err(to_napi_error)?;
        Ok(UiEvent::ArtworkDetails { details }.to_json())
    }

    /// Open an image URL with the system viewer
    #[napi]
    pub async fn open_image(&self, url: String) -> Result<()> {
        let session = self.inner.lock().await;
        session.open_image(&url).map_err(to_napi_error)
    }

    /// Send a chat message.
    ///
    /// `callback` receives `chat-token` events in order, then exactly one
    /// `chat-complete` or `chat-error`. The promise resolves to the full
    /// reply and rejects when the stream failed.
    #[napi]
    pub async fn send_chat_message(
        &self,
        message: String,
        #[napi(ts_arg_type = "(err: Error | null, event: any) => void")]
        callback: ThreadsafeFunction<serde_json::Value>,
    ) -> Result<String> {
        let mut session = self.inner.lock().await;
        session
            .send_chat_message(&message, |event| {
                let payload = UiEvent::from(event).to_json();
                callback.call(Ok(payload), ThreadsafeFunctionCallMode::Blocking);
            })
            .await
            .map_err(to_napi_error)
    }

    /// Forget the conversation history
    #[napi]
    pub async fn clear_chat(&self) {
        self.inner.lock().await.clear_chat();
    }

    /// Tools offered by the collection server, in server order
    #[napi]
    pub async fn tools(&self) -> Vec<ToolInfo> {
        let session = self.inner.lock().await;
        session.tools().into_iter().map(ToolInfo::from).collect()
    }

    #[napi]
    pub async fn history(&self) -> Vec<ChatTurn> {
        let session = self.inner.lock().await;
        session.history().iter().map(ChatTurn::from).collect()
    }

    /// Artworks remembered from earlier turns, oldest first
    #[napi(ts_return_type = "Promise<any[]>")]
    pub async fn recent(&self) -> Result<serde_json::Value> {
        let session = self.inner.lock().await;
        serde_json::to_value(session.recent()).map_err(to_napi_error)
    }
}

/// Load configuration, start the collection server and discover its tools.
///
/// Rejects when the model credential is missing, the server cannot be
/// started, or tool discovery fails.
#[napi]
pub async fn connect(options: Option<ConnectOptions>) -> Result<MuseumChat> {
    let options = options.unwrap_or(ConnectOptions {
        config_path: None,
        provider: None,
        model: None,
        verbose: None,
    });

    let logger: Arc<dyn Logger> = match options.verbose {
        Some(verbose) => Arc::new(ConsoleLogger::new().verbose(verbose)),
        None => Arc::new(NoOpLogger::new()),
    };

    let file = match options.config_path {
        Some(path) => FileConfigProvider::new(path),
        None => FileConfigProvider::user(),
    };
    let mut config: AppConfig = file.load().await.map_err(to_napi_error)?;
    config.apply_env_overrides();
    if let Some(provider) = options.provider {
        config.llm.provider = provider.trim().to_lowercase();
    }
    if let Some(model) = options.model {
        config.llm.model = model;
    }

    let session = MuseumSession::connect(
        config,
        Arc::new(EnvSecretStore::new()),
        Arc::new(SystemOpener),
        logger,
    )
    .await
    .map_err(to_napi_error)?;

    Ok(MuseumChat {
        inner: Arc::new(Mutex::new(session)),
    })
}

/// Get list of all supported provider IDs
#[napi]
pub fn get_supported_providers() -> Vec<String> {
    core_supported_providers().iter().map(|s| s.to_string()).collect()
}

/// Location of the user-level config file
#[napi]
pub fn default_config_path() -> String {
    FileConfigProvider::user().path().to_string_lossy().to_string()
}
