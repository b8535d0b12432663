//! Session façade for hosts
//!
//! Wires the collection server, the tool layer and a model backend into one
//! object that answers the presentation layer's commands: search,
//! get-details, open-image, send-chat-message and clear-chat.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::actions::{DirectActionExtractor, ResourceOpener};
use crate::bridge::ConversationBridge;
use crate::config::{AppConfig, ConfigError, McpTransportKind, COLLECTION_KEY_ENV};
use crate::context::{artwork_records, ContextAssembler};
use crate::intent::{extract, TriggerPhraseMatcher};
use crate::logging::Logger;
use crate::mcp::{McpClient, McpError};
use crate::providers::{
    create_provider, Provider, ProviderError, ProviderModelConfig, ProviderResult, StreamChatOptions,
};
use crate::secrets::SecretStore;
use crate::tools::{names, ToolError, ToolInvoker, ToolRegistry, ToolTransport};
use crate::types::{ArtworkDetails, ArtworkSummary, ChatEvent, ChatMessage, ToolDescriptor, ToolOutput};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Failed to open {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// One user's conversation with the collection
pub struct MuseumSession {
    bridge: ConversationBridge,
    invoker: Arc<ToolInvoker>,
    opener: Arc<dyn ResourceOpener>,
    logger: Arc<dyn Logger>,
}

impl MuseumSession {
    /// Connect everything described by `config`.
    ///
    /// Fails on a missing model credential, an unreachable collection server
    /// or a failed tool listing. There is no degraded start.
    pub async fn connect(
        config: AppConfig,
        secrets: Arc<dyn SecretStore>,
        opener: Arc<dyn ResourceOpener>,
        logger: Arc<dyn Logger>,
    ) -> SessionResult<Self> {
        config.validate()?;
        let model = config.llm.resolve(secrets.as_ref())?;
        let provider = create_provider(&config.llm.provider, secrets.clone(), logger.clone())?;

        let transport = connect_transport(&config, secrets.as_ref(), &logger).await?;

        Ok(Self::from_parts(transport, provider, model, opener, logger)
            .await?
            .with_options(config.llm.options()))
    }

    /// Build a session over an existing transport and provider.
    /// Tool discovery still runs and its failure is still fatal.
    pub async fn from_parts(
        transport: Arc<dyn ToolTransport>,
        provider: Arc<dyn Provider>,
        model: ProviderModelConfig,
        opener: Arc<dyn ResourceOpener>,
        logger: Arc<dyn Logger>,
    ) -> SessionResult<Self> {
        let registry = Arc::new(ToolRegistry::new(transport.clone(), logger.clone()));
        registry.discover().await?;

        let invoker = Arc::new(ToolInvoker::new(transport, logger.clone()));
        let assembler = ContextAssembler::new(
            Box::new(TriggerPhraseMatcher::museum_defaults()),
            invoker.clone(),
            logger.clone(),
        );
        let extractor = DirectActionExtractor::new(invoker.clone(), opener.clone(), logger.clone());
        let bridge = ConversationBridge::new(registry, assembler, extractor, provider, model, logger.clone());

        crate::log_info!(
            logger,
            "[MuseumSession] Ready with {} tools",
            bridge.registry().tool_count()
        );

        Ok(Self {
            bridge,
            invoker,
            opener,
            logger,
        })
    }

    pub fn with_options(mut self, options: StreamChatOptions) -> Self {
        self.bridge = self.bridge.with_options(options);
        self
    }

    /// Search the collection. Results are remembered for later turns.
    pub async fn search(&mut self, query: &str) -> SessionResult<Vec<ArtworkSummary>> {
        let output = self
            .call(names::SEARCH_ARTWORK, extract::search_request(query.trim()))
            .await?;
        Ok(output.as_json().map(artwork_records).unwrap_or_default())
    }

    /// Fetch details for one object number
    pub async fn get_details(&mut self, object_number: &str) -> SessionResult<ArtworkDetails> {
        let tool = names::GET_ARTWORK_DETAILS;
        let output = self
            .call(tool, serde_json::json!({ "objectNumber": object_number.trim() }))
            .await?;

        let summary = output
            .as_json()
            .and_then(|data| artwork_records(data).into_iter().next());
        let text = self.bridge.assembler().format(tool, &output);
        let raw = match output {
            ToolOutput::Json(value) => value,
            ToolOutput::Text(text) => Value::String(text),
        };

        Ok(ArtworkDetails { summary, text, raw })
    }

    /// Open an image URL on this machine
    pub fn open_image(&self, url: &str) -> SessionResult<()> {
        self.logger.info(&format!("[MuseumSession] Opening {}", url));
        self.opener.open(url).map_err(|source| SessionError::Open {
            url: url.to_string(),
            source,
        })
    }

    pub async fn send_chat_message<F>(&mut self, message: &str, on_event: F) -> ProviderResult<String>
    where
        F: FnMut(ChatEvent) + Send,
    {
        self.bridge.send(message, on_event).await
    }

    pub fn clear_chat(&mut self) {
        self.bridge.reset();
    }

    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.bridge.registry().tools()
    }

    pub fn history(&self) -> &[ChatMessage] {
        self.bridge.history()
    }

    pub fn recent(&self) -> Vec<ArtworkSummary> {
        self.bridge.recent()
    }

    /// Invoke a discovered tool and remember any artworks it returns
    async fn call(&mut self, tool: &str, arguments: Value) -> SessionResult<ToolOutput> {
        if self.bridge.registry().lookup(tool).is_none() {
            return Err(ToolError::UnknownTool(tool.to_string()).into());
        }
        let output = self.invoker.invoke(tool, arguments).await?;
        self.bridge.assembler_mut().remember(tool, &output);
        Ok(output)
    }
}

async fn connect_transport(
    config: &AppConfig,
    secrets: &dyn SecretStore,
    logger: &Arc<dyn Logger>,
) -> SessionResult<Arc<dyn ToolTransport>> {
    let mcp = &config.mcp;
    let client = match mcp.transport {
        McpTransportKind::Stdio => {
            let env = mcp.resolved_env(secrets);
            if !env.contains_key(COLLECTION_KEY_ENV) {
                logger.warn(&format!(
                    "[MuseumSession] {} is not set; the collection server may refuse requests",
                    COLLECTION_KEY_ENV
                ));
            }
            McpClient::connect_stdio(&mcp.command, &mcp.args, &env, logger.clone()).await?
        }
        McpTransportKind::Http => {
            let url = mcp.url.as_deref().unwrap_or_default();
            McpClient::connect_http(url, logger.clone()).await?
        }
        #[cfg(unix)]
        McpTransportKind::Unix => {
            let path = mcp.socket_path.as_deref().unwrap_or_default();
            McpClient::connect_unix(path, logger.clone()).await?
        }
        #[cfg(not(unix))]
        McpTransportKind::Unix => {
            return Err(ConfigError::Invalid("unix sockets are not supported on this platform".to_string()).into());
        }
    };
    Ok(Arc::new(client))
}
