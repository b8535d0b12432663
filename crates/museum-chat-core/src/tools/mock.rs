//! Scripted transport for testing
//!
//! Plays back queued responses per tool without a server. The last queued
//! response for a tool repeats once the queue is down to it.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::mcp::{McpError, McpResult};
use crate::types::{ToolDescriptor, ToolEnvelope};

use super::transport::ToolTransport;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(ToolEnvelope),
    Fail { status: Option<u16>, message: String },
}

/// Mock tool transport
#[derive(Debug, Default)]
pub struct MockTransport {
    tools: Vec<ToolDescriptor>,
    discovery_error: Option<String>,
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise tools by name, in the given order
    pub fn with_tools<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tools: names.into_iter().map(ToolDescriptor::new).collect(),
            ..Self::default()
        }
    }

    /// A transport whose tool listing fails
    pub fn failing_discovery(message: impl Into<String>) -> Self {
        Self {
            discovery_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Queue a response for a tool
    pub fn respond(self, tool: &str, envelope: ToolEnvelope) -> Self {
        self.push(tool, Scripted::Respond(envelope))
    }

    /// Queue a transport failure for a tool
    pub fn fail(self, tool: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        self.push(
            tool,
            Scripted::Fail {
                status,
                message: message.into(),
            },
        )
    }

    fn push(self, tool: &str, scripted: Scripted) -> Self {
        self.scripts
            .lock()
            .entry(tool.to_string())
            .or_default()
            .push_back(scripted);
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    /// Number of calls made to one tool
    pub fn call_count(&self, tool: &str) -> usize {
        self.calls.lock().iter().filter(|(name, _)| name == tool).count()
    }
}

#[async_trait]
impl ToolTransport for MockTransport {
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>> {
        match &self.discovery_error {
            Some(message) => Err(McpError::Protocol(message.clone())),
            None => Ok(self.tools.clone()),
        }
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolEnvelope> {
        self.calls.lock().push((name.to_string(), arguments));

        let next = {
            let mut scripts = self.scripts.lock();
            scripts.get_mut(name).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };

        match next {
            Some(Scripted::Respond(envelope)) => Ok(envelope),
            Some(Scripted::Fail { status, message }) => Err(McpError::tool_call(status, message)),
            None => Err(McpError::tool_call(
                None,
                format!("no scripted response for {}", name),
            )),
        }
    }
}
