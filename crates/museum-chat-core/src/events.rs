//! Events for the presentation layer

use serde::Serialize;

use crate::types::{ArtworkDetails, ArtworkSummary, ChatEvent};

/// Event pushed to the UI, serialized as `{"type": "chat-token", ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiEvent {
    ArtworkList { artworks: Vec<ArtworkSummary> },
    ArtworkDetails { details: ArtworkDetails },
    ChatToken { token: String },
    ChatComplete { message: String },
    ChatError { error: String },
}

impl UiEvent {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "type": "chat-error", "error": e.to_string() })
        })
    }
}

impl From<ChatEvent> for UiEvent {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::Token(token) => UiEvent::ChatToken { token },
            ChatEvent::Complete(message) => UiEvent::ChatComplete { message },
            ChatEvent::Error(error) => UiEvent::ChatError { error },
        }
    }
}
