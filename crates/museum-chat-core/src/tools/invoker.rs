//! Single tool calls with retry on transient server errors

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::logging::Logger;
use crate::types::{ToolEnvelope, ToolOutput};

use super::error::{status_from_text, ToolError, ToolResult};
use super::transport::ToolTransport;

/// When to repeat a failed tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub max_retries: u32,
    /// Fixed wait between attempts
    pub delay: Duration,
    /// The only status that is retried
    pub retry_status: u16,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
            retry_status: 500,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn is_retryable(&self, err: &ToolError) -> bool {
        err.status() == Some(self.retry_status)
    }
}

/// Performs tool calls against a transport
pub struct ToolInvoker {
    transport: Arc<dyn ToolTransport>,
    policy: RetryPolicy,
    logger: Arc<dyn Logger>,
}

impl ToolInvoker {
    pub fn new(transport: Arc<dyn ToolTransport>, logger: Arc<dyn Logger>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            logger,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call a tool, retrying sequentially while it fails with the retry status
    pub async fn invoke(&self, tool: &str, arguments: Value) -> ToolResult<ToolOutput> {
        let total = self.policy.max_retries + 1;
        let mut attempt = 1;

        loop {
            let err = match self.attempt(tool, arguments.clone()).await {
                Ok(output) => return Ok(output),
                Err(err) => err,
            };

            if !self.policy.is_retryable(&err) {
                self.logger.error(&format!("[ToolInvoker] {} failed: {}", tool, err));
                return Err(err);
            }

            if attempt >= total {
                self.logger.error(&format!(
                    "[ToolInvoker] {} still failing after {} retries: {}",
                    tool, self.policy.max_retries, err
                ));
                return Err(ToolError::invocation(
                    Some(self.policy.retry_status),
                    format!(
                        "Server error persisted after {} retries: {}",
                        self.policy.max_retries,
                        error_message(&err)
                    ),
                ));
            }

            attempt += 1;
            crate::log_warn!(
                self.logger,
                "[ToolInvoker] {} returned status {}, retrying (attempt {}/{})",
                tool,
                self.policy.retry_status,
                attempt,
                total
            );
            tokio::time::sleep(self.policy.delay).await;
        }
    }

    async fn attempt(&self, tool: &str, arguments: Value) -> ToolResult<ToolOutput> {
        let envelope = self.transport.call_tool(tool, arguments).await?;
        parse_envelope(tool, &envelope)
    }
}

fn error_message(err: &ToolError) -> &str {
    match err {
        ToolError::Invocation { message, .. } => message,
        ToolError::Discovery(message) => message,
        ToolError::InvalidResponse { tool } => tool,
        ToolError::UnknownTool(tool) => tool,
    }
}

/// Turn a response envelope into a tool output.
///
/// Text blocks are joined with newlines and parsed as JSON when possible.
pub(crate) fn parse_envelope(tool: &str, envelope: &ToolEnvelope) -> ToolResult<ToolOutput> {
    let text = envelope.joined_text().filter(|t| !t.trim().is_empty());

    if envelope.is_error {
        let message = text.unwrap_or_else(|| format!("{} reported an error", tool));
        return Err(ToolError::invocation(status_from_text(&message), message));
    }

    match text {
        Some(text) => Ok(ToolOutput::parse(&text)),
        None => Err(ToolError::InvalidResponse {
            tool: tool.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::tools::MockTransport;
    use crate::types::ContentBlock;
    use serde_json::json;
    use tokio::time::Instant;

    fn invoker(transport: &Arc<MockTransport>) -> ToolInvoker {
        ToolInvoker::new(transport.clone(), Arc::new(NoOpLogger))
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_500_is_attempted_four_times() {
        let transport = Arc::new(MockTransport::new().fail("search_artwork", Some(500), "upstream down"));

        let err = invoker(&transport)
            .invoke("search_artwork", json!({"query": "tulips"}))
            .await
            .unwrap_err();

        assert_eq!(transport.call_count("search_artwork"), 4);
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("after 3 retries"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_status_is_attempted_once() {
        let transport = Arc::new(MockTransport::new().fail("search_artwork", Some(404), "not found"));

        let err = invoker(&transport)
            .invoke("search_artwork", json!({}))
            .await
            .unwrap_err();

        assert_eq!(transport.call_count("search_artwork"), 1);
        assert_eq!(err, ToolError::invocation(Some(404), "not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_without_status_is_attempted_once() {
        let transport = Arc::new(MockTransport::new().fail("search_artwork", None, "closed"));

        invoker(&transport).invoke("search_artwork", json!({})).await.unwrap_err();
        assert_eq!(transport.call_count("search_artwork"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_three_failures() {
        let transport = Arc::new(
            MockTransport::new()
                .fail("search_artwork", Some(500), "busy")
                .fail("search_artwork", Some(500), "busy")
                .fail("search_artwork", Some(500), "busy")
                .respond("search_artwork", ToolEnvelope::json(&json!({"count": 1}))),
        );

        let started = Instant::now();
        let output = invoker(&transport)
            .invoke("search_artwork", json!({}))
            .await
            .unwrap();

        assert_eq!(output, ToolOutput::Json(json!({"count": 1})));
        assert_eq!(transport.call_count("search_artwork"), 4);
        // three fixed one-second waits, no backoff growth
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tool_side_error_status_is_retried() {
        let transport = Arc::new(
            MockTransport::new()
                .respond("get_artwork_details", ToolEnvelope::error("Request failed with status code 500"))
                .respond("get_artwork_details", ToolEnvelope::text("plain details")),
        );

        let output = invoker(&transport)
            .invoke("get_artwork_details", json!({"objectNumber": "SK-C-5"}))
            .await
            .unwrap();

        assert_eq!(output, ToolOutput::Text("plain details".to_string()));
        assert_eq!(transport.call_count("get_artwork_details"), 2);
    }

    #[test]
    fn test_parse_envelope_joins_text_blocks() {
        let envelope = ToolEnvelope::new(vec![
            ContentBlock::Text("{\"count\":".to_string()),
            ContentBlock::Text("3}".to_string()),
        ]);
        assert_eq!(
            parse_envelope("search_artwork", &envelope).unwrap(),
            ToolOutput::Json(json!({"count": 3}))
        );
    }

    #[test]
    fn test_parse_envelope_without_text_is_invalid() {
        let envelope = ToolEnvelope::new(vec![ContentBlock::Other("image".to_string())]);
        let err = parse_envelope("get_artwork_image", &envelope).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidResponse {
                tool: "get_artwork_image".to_string()
            }
        );
        assert!(err.to_string().contains("invalid response format"));
    }

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
        assert_eq!(policy.retry_status, 500);
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }
}
