//! Tool layer error types

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::mcp::McpError;

/// Errors from tool discovery and invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// The remote tool listing failed. Fatal to session start.
    #[error("Tool discovery failed: {0}")]
    Discovery(String),

    /// A tool call failed
    #[error("Tool call failed: {message}")]
    Invocation {
        status: Option<u16>,
        message: String,
    },

    /// The tool answered without any text content
    #[error("Tool '{tool}' returned an invalid response format")]
    InvalidResponse { tool: String },

    /// The tool is not in the discovered set
    #[error("Tool '{0}' is not offered by the collection server")]
    UnknownTool(String),
}

impl ToolError {
    pub fn invocation(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Invocation {
            status,
            message: message.into(),
        }
    }

    /// Status attached to an invocation error
    pub fn status(&self) -> Option<u16> {
        match self {
            ToolError::Invocation { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<McpError> for ToolError {
    fn from(err: McpError) -> Self {
        match err {
            McpError::ToolCallFailed { status, message } => Self::Invocation { status, message },
            other => Self::Invocation {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

static STATUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bstatus(?:\s+code)?\s*[:=]?\s*(\d{3})\b").expect("status pattern is valid")
});

/// Pull an HTTP status out of an error message such as
/// "Request failed with status code 500"
pub fn status_from_text(text: &str) -> Option<u16> {
    STATUS_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
