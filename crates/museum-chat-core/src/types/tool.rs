//! Tool descriptors and the call/response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool advertised by the remote provider at discovery time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema hint for the tool's arguments
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// A tool chosen for a message together with its synthesized arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ToolIntent {
    pub tool: String,
    pub arguments: Value,
}

impl ToolIntent {
    pub fn new(tool: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool: tool.into(),
            arguments,
        }
    }

    /// Get a string argument
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// One block of a tool response
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    /// Non-text content (images, resources); carried for logging only
    Other(String),
}

/// Raw response of a single tool call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolEnvelope {
    pub content: Vec<ContentBlock>,
    pub is_error: bool,
}

impl ToolEnvelope {
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    /// Envelope with a single text block
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![ContentBlock::Text(text.into())])
    }

    /// Envelope with a single JSON-encoded text block
    pub fn json(value: &Value) -> Self {
        Self::text(value.to_string())
    }

    /// Envelope flagged as a tool-side error
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
            is_error: true,
        }
    }

    /// Text blocks joined with newlines, or `None` when there are none
    pub fn joined_text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                ContentBlock::Other(_) => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }
}

/// Parsed result of a tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// The text parsed as JSON
    Json(Value),
    /// The text as-is when it is not JSON
    Text(String),
}

impl ToolOutput {
    /// Parse concatenated tool text, keeping it raw when it is not JSON
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => ToolOutput::Json(value),
            Err(_) => ToolOutput::Text(text.to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ToolOutput::Json(value) => Some(value),
            ToolOutput::Text(_) => None,
        }
    }

    /// Render for the generic formatter
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Json(value) => value.to_string(),
            ToolOutput::Text(text) => text.clone(),
        }
    }
}
