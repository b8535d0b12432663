//! Transport seam between the tool layer and the remote provider

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::McpResult;
use crate::types::{ToolDescriptor, ToolEnvelope};

/// Request/response channel to a remote tool provider
///
/// Implementations:
/// - `McpClient`: the rmcp client (stdio, HTTP, Unix socket)
/// - `MockTransport`: scripted responses for tests
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// List the tools the provider advertises, in provider order
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>>;

    /// Call one tool and return its raw envelope
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolEnvelope>;
}
