//! Tool registry
//!
//! Holds the tools advertised by the remote provider. The set is replaced
//! wholesale on each successful discovery, so readers see either nothing or a
//! complete listing, always in the order the provider returned it.

use std::sync::Arc;
use parking_lot::RwLock;

use crate::logging::Logger;
use crate::types::ToolDescriptor;

use super::error::{ToolError, ToolResult};
use super::transport::ToolTransport;

/// Registry of discovered tools
pub struct ToolRegistry {
    transport: Arc<dyn ToolTransport>,
    /// `None` until the first successful discovery
    tools: RwLock<Option<Vec<ToolDescriptor>>>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    pub fn new(transport: Arc<dyn ToolTransport>, logger: Arc<dyn Logger>) -> Self {
        Self {
            transport,
            tools: RwLock::new(None),
            logger,
        }
    }

    /// Fetch the tool listing and replace the stored set.
    ///
    /// On failure the previous set is kept and the error is returned; callers
    /// starting a session must treat it as fatal.
    pub async fn discover(&self) -> ToolResult<Vec<ToolDescriptor>> {
        let tools = match self.transport.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                self.logger.error(&format!(
                    "[ToolRegistry] Failed to fetch tools: {}",
                    e
                ));
                return Err(ToolError::Discovery(e.to_string()));
            }
        };

        crate::log_info!(
            self.logger,
            "[ToolRegistry] Discovered {} tools: {}",
            tools.len(),
            tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        *self.tools.write() = Some(tools.clone());
        Ok(tools)
    }

    /// Snapshot of the discovered tools in provider order
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools.read().clone().unwrap_or_default()
    }

    /// Find a tool by name
    pub fn lookup(&self, name: &str) -> Option<ToolDescriptor> {
        self.tools
            .read()
            .as_ref()
            .and_then(|tools| tools.iter().find(|t| t.name == name).cloned())
    }

    pub fn is_discovered(&self) -> bool {
        self.tools.read().is_some()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.read().as_ref().map_or(0, Vec::len)
    }
}
