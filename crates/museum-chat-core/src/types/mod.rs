//! Core types shared across the tool and chat layers

mod message;
mod tool;
mod stream;
mod artwork;

pub use message::{ChatMessage, MessageRole};
pub use tool::{ContentBlock, ToolDescriptor, ToolEnvelope, ToolIntent, ToolOutput};
pub use stream::{ChatEvent, StreamChunk};
pub use artwork::{ArtworkDetails, ArtworkSummary};
