//! Streaming types: provider chunks in, chat events out

use serde::{Deserialize, Serialize};

/// Streaming chunk from a language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// Answer text
    Text { text: String },
    /// Model reasoning, not shown to the user
    Reasoning { text: String },
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        StreamChunk::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamChunk::Text { text } => Some(text),
            StreamChunk::Reasoning { .. } => None,
        }
    }
}

/// Event relayed from the conversation bridge to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// One token (or token group) of the assistant reply
    Token(String),
    /// The full assistant reply
    Complete(String),
    /// The stream failed; no assistant turn was recorded
    Error(String),
}
