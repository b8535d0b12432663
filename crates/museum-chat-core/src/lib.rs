//! Museum Chat Core
//!
//! Tool orchestration and streaming chat for a museum-collection assistant.
//! The crate is runtime-agnostic apart from tokio; hosts (the Node.js
//! binding, tests, a CLI) supply a logger and a resource opener.
//!
//! ## Flow
//!
//! ```text
//! message ─► DirectActionExtractor ─► ContextAssembler ─► ConversationBridge ─► events
//!                 (recent cache)      IntentMatcher         prompt + stream
//!                                     ToolInvoker (retry)
//!                                     FormatterTable
//! ```
//!
//! ```rust,ignore
//! use museum_chat_core::{AppConfig, ConsoleLogger, EnvSecretStore, MuseumSession, SystemOpener};
//!
//! let mut session = MuseumSession::connect(
//!     config,
//!     Arc::new(EnvSecretStore::new()),
//!     Arc::new(SystemOpener),
//!     Arc::new(ConsoleLogger::new()),
//! )
//! .await?;
//!
//! session.send_chat_message("find sunflowers", |event| println!("{:?}", event)).await?;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod tools;
pub mod mcp;
pub mod intent;
pub mod context;
pub mod actions;
pub mod bridge;
pub mod events;
pub mod session;

pub use types::{
    ArtworkDetails, ArtworkSummary, ChatEvent, ChatMessage, MessageRole, StreamChunk,
    ToolDescriptor, ToolIntent, ToolOutput,
};

pub use secrets::{EnvSecretStore, MemorySecretStore, SecretStore};

pub use logging::{ConsoleLogger, Logger, NoOpLogger};

pub use config::{AppConfig, ConfigError, ConfigProvider, FileConfigProvider, MemoryConfigProvider};

pub use providers::{create_provider, supported_providers, Provider, ProviderError};

pub use tools::{RetryPolicy, ToolError, ToolInvoker, ToolRegistry, ToolTransport};

pub use mcp::{McpClient, McpError};

pub use intent::{IntentMatcher, TriggerPhraseMatcher};

pub use context::{ContextAssembler, ContextOutcome};

pub use actions::{DirectAction, DirectActionExtractor, ResourceOpener, SystemOpener};

pub use bridge::ConversationBridge;

pub use events::UiEvent;

pub use session::{MuseumSession, SessionError};
