//! MCP client using the official rmcp SDK

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceError, ServiceExt,
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, ErrorCode,
        Implementation, RawContent, Tool,
    },
    service::RunningService,
    RoleClient,
};
use serde_json::Value;
use thiserror::Error;

#[cfg(unix)]
use tokio::net::UnixStream;

use crate::logging::Logger;
use crate::tools::{status_from_text, ToolTransport};
use crate::types::{ContentBlock, ToolDescriptor, ToolEnvelope};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {message}")]
    ToolCallFailed {
        /// Status reported by the transport, when there is one
        status: Option<u16>,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl McpError {
    /// Create a tool call failure
    pub fn tool_call(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ToolCallFailed {
            status,
            message: message.into(),
        }
    }

    /// Transport status carried by this error
    pub fn status(&self) -> Option<u16> {
        match self {
            McpError::ToolCallFailed { status, .. } => *status,
            _ => None,
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

/// MCP client for the collection tool server
pub struct McpClient {
    client: RunningService<RoleClient, ClientInfo>,
    logger: Arc<dyn Logger>,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "museum-chat".to_string(),
            title: Some("Museum Chat".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

impl McpClient {
    /// Spawn the server as a child process and speak MCP over its stdio
    pub async fn connect_stdio(
        command: &str,
        args: &[String],
        env: &BTreeMap<String, String>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::TokioChildProcess;

        logger.info(&format!(
            "[McpClient] Spawning server: {} {}",
            command,
            args.join(" ")
        ));

        let mut cmd = tokio::process::Command::new(command);
        cmd.args(args).envs(env);

        let transport = TokioChildProcess::new(cmd)
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self { client, logger })
    }

    /// Connect to an MCP server over a Unix socket
    #[cfg(unix)]
    pub async fn connect_unix<P: AsRef<Path>>(
        socket_path: P,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        let path = socket_path.as_ref();
        logger.info(&format!("[McpClient] Connecting to Unix socket: {:?}", path));

        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let client = client_info()
            .serve(stream)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self { client, logger })
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(url: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        use rmcp::transport::StreamableHttpClientTransport;

        logger.info(&format!("[McpClient] Connecting to HTTP: {}", url));

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self { client, logger })
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Close the connection
    pub async fn close(self) -> McpResult<()> {
        self.logger.info("[McpClient] Closing connection");
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ToolTransport for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>> {
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] Listed {} tools",
            result.tools.len()
        ));

        Ok(result.tools.into_iter().map(to_descriptor).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolEnvelope> {
        self.logger.info(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result = self
            .client
            .call_tool(params)
            .await
            .map_err(|e| McpError::tool_call(service_status(&e), e.to_string()))?;

        Ok(to_envelope(result))
    }
}

fn to_descriptor(tool: Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: serde_json::to_value(tool.input_schema.as_ref()).ok(),
    }
}

fn to_envelope(result: CallToolResult) -> ToolEnvelope {
    // Content is Annotated<RawContent>, the payload lives in .raw
    let content = result
        .content
        .iter()
        .map(|c| match &c.raw {
            RawContent::Text(t) => ContentBlock::Text(t.text.clone()),
            RawContent::Image(_) => ContentBlock::Other("image".to_string()),
            _ => ContentBlock::Other("resource".to_string()),
        })
        .collect();

    ToolEnvelope {
        content,
        is_error: result.is_error.unwrap_or(false),
    }
}

/// Map an rmcp failure to an HTTP-like status.
///
/// JSON-RPC internal errors count as 500; transport errors may carry the
/// upstream status in their message.
fn service_status(err: &ServiceError) -> Option<u16> {
    match err {
        ServiceError::McpError(data) if data.code == ErrorCode::INTERNAL_ERROR => Some(500),
        other => status_from_text(&other.to_string()),
    }
}
