//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to reach the museum collection tool server.
//! Supports child-process (stdio), Unix socket and HTTP transports.
//!
//! # Example
//!
//! ```rust,ignore
//! use museum_chat_core::mcp::McpClient;
//! use museum_chat_core::tools::ToolTransport;
//!
//! let client = McpClient::connect_stdio("npx", &["-y".into(), "mcp-server-rijksmuseum".into()], &env, logger).await?;
//! let tools = client.list_tools().await?;
//! let envelope = client.call_tool("search_artwork", json!({ "query": "tulips" })).await?;
//! ```

mod client;

pub use client::{McpClient, McpError, McpResult};
