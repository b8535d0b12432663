//! Conversation bridge
//!
//! Owns the turn history and drives one message through the direct-action
//! pre-pass (or, when no action applies, context assembly) and a streamed
//! model reply.
//!
//! The user turn is recorded before anything goes over the network. The
//! assistant turn is recorded only when a reply completes, so a failed
//! stream leaves the history ending with the user turn.

use std::sync::Arc;

use futures::StreamExt;

use crate::actions::DirectActionExtractor;
use crate::context::{ContextAssembler, ContextOutcome};
use crate::logging::Logger;
use crate::providers::{Provider, ProviderModelConfig, ProviderResult, StreamChatOptions};
use crate::tools::ToolRegistry;
use crate::types::{ArtworkSummary, ChatEvent, ChatMessage};

/// First line of every prompt
pub const FRAMING: &str = "You are a knowledgeable guide to the Rijksmuseum collection. \
Use the action and context below when they are relevant and answer conversationally.";

/// Combined prompt sent in place of the user's turn
pub fn build_prompt(action: Option<&str>, context: Option<&str>, message: &str) -> String {
    let mut lines = vec![format!("System: {}", FRAMING)];
    if let Some(action) = action {
        lines.push(format!("Action: {}", action));
    }
    if let Some(context) = context {
        lines.push(format!("Context: {}", context));
    }
    lines.push(format!("User: {}", message));
    lines.join("\n")
}

pub struct ConversationBridge {
    registry: Arc<ToolRegistry>,
    assembler: ContextAssembler,
    extractor: DirectActionExtractor,
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    options: StreamChatOptions,
    history: Vec<ChatMessage>,
    logger: Arc<dyn Logger>,
}

impl ConversationBridge {
    pub fn new(
        registry: Arc<ToolRegistry>,
        assembler: ContextAssembler,
        extractor: DirectActionExtractor,
        provider: Arc<dyn Provider>,
        model: ProviderModelConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            registry,
            assembler,
            extractor,
            provider,
            model,
            options: StreamChatOptions::default(),
            history: Vec::new(),
            logger,
        }
    }

    pub fn with_options(mut self, options: StreamChatOptions) -> Self {
        self.options = options;
        self
    }

    /// Send a message, relaying the reply through `on_event`.
    ///
    /// Tokens are delivered in order, each before the next is pulled from
    /// the model. Ends with exactly one `Complete` or `Error` event.
    pub async fn send<F>(&mut self, message: &str, mut on_event: F) -> ProviderResult<String>
    where
        F: FnMut(ChatEvent) + Send,
    {
        self.history.push(ChatMessage::user(message));

        let recent = self.assembler.recent();
        let action = self.extractor.try_direct_action(message, &recent).await;

        // A completed direct action replaces intent matching for this turn
        let outcome = match action.as_ref() {
            Some(action) => match &action.fetched {
                Some((tool, output)) => {
                    self.assembler.remember(tool, output);
                    ContextOutcome::Context {
                        tool: tool.clone(),
                        text: self.assembler.format(tool, output),
                    }
                }
                None => ContextOutcome::NoMatch,
            },
            None => {
                let tools = self.registry.tools();
                self.assembler.build_context(message, &tools).await
            }
        };

        if let ContextOutcome::Degraded(reply) = &outcome {
            self.logger.info("[ConversationBridge] Tool failed; replying without the model");
            self.history.push(ChatMessage::assistant(reply.clone()));
            on_event(ChatEvent::Complete(reply.clone()));
            return Ok(reply.clone());
        }

        let prompt = build_prompt(
            action.as_ref().map(|a| a.summary.as_str()),
            outcome.context(),
            message,
        );
        let mut messages = self.history.clone();
        if let Some(last) = messages.last_mut() {
            *last = ChatMessage::user(prompt);
        }

        self.logger.debug(&format!(
            "[ConversationBridge] Streaming {} turns via {}",
            messages.len(),
            self.provider.name()
        ));

        let mut stream = match self
            .provider
            .stream_chat(messages, self.model.clone(), self.options.clone())
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                self.logger.error(&format!("[ConversationBridge] Stream failed to start: {}", e));
                on_event(ChatEvent::Error(e.to_string()));
                return Err(e);
            }
        };

        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => {
                    if let Some(text) = chunk.as_text() {
                        reply.push_str(text);
                        on_event(ChatEvent::Token(text.to_string()));
                    }
                }
                Err(e) => {
                    self.logger.error(&format!("[ConversationBridge] Stream error: {}", e));
                    on_event(ChatEvent::Error(e.to_string()));
                    return Err(e);
                }
            }
        }

        self.history.push(ChatMessage::assistant(reply.clone()));
        on_event(ChatEvent::Complete(reply.clone()));
        Ok(reply)
    }

    /// [`send`](Self::send) without event delivery
    pub async fn chat(&mut self, message: &str) -> ProviderResult<String> {
        self.send(message, |_| {}).await
    }

    /// Clear the history. Recently seen artworks are kept.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn recent(&self) -> Vec<ArtworkSummary> {
        self.assembler.recent()
    }

    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    pub fn assembler_mut(&mut self) -> &mut ContextAssembler {
        &mut self.assembler
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ResourceOpener;
    use crate::context::DEGRADED_REPLY;
    use crate::intent::TriggerPhraseMatcher;
    use crate::logging::NoOpLogger;
    use crate::providers::MockProvider;
    use crate::tools::{MockTransport, RetryPolicy, ToolInvoker};
    use crate::types::{MessageRole, ToolEnvelope};
    use serde_json::json;

    struct NoOpener;

    impl ResourceOpener for NoOpener {
        fn open(&self, _url: &str) -> std::io::Result<()> {
            Ok(())
        }
    }

    async fn bridge(transport: MockTransport, provider: Arc<MockProvider>) -> ConversationBridge {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
        let transport = Arc::new(transport);
        let registry = Arc::new(ToolRegistry::new(transport.clone(), logger.clone()));
        registry.discover().await.unwrap();

        let invoker = Arc::new(
            ToolInvoker::new(transport, logger.clone()).with_policy(RetryPolicy::none()),
        );
        let assembler = ContextAssembler::new(
            Box::new(TriggerPhraseMatcher::museum_defaults()),
            invoker.clone(),
            logger.clone(),
        );
        let extractor = DirectActionExtractor::new(invoker, Arc::new(NoOpener), logger.clone());

        ConversationBridge::new(
            registry,
            assembler,
            extractor,
            provider,
            ProviderModelConfig::new("mock"),
            logger,
        )
    }

    fn recorder() -> (Arc<parking_lot::Mutex<Vec<ChatEvent>>>, impl FnMut(ChatEvent) + Send) {
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = events.clone();
        (events, move |event| sink.lock().push(event))
    }

    #[tokio::test]
    async fn test_no_match_prompt_has_framing_and_message_only() {
        let provider = Arc::new(MockProvider::fixed("Hi!", Arc::new(NoOpLogger)));
        let mut bridge = bridge(MockTransport::with_tools(["search_artwork"]), provider.clone()).await;

        bridge.chat("hello").await.unwrap();

        let sent = provider.last_request().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, format!("System: {}\nUser: hello", FRAMING));
    }

    #[tokio::test]
    async fn test_success_history_and_events() {
        let provider = Arc::new(MockProvider::chunked(["Hel", "lo"], Arc::new(NoOpLogger)));
        let mut bridge = bridge(MockTransport::new(), provider).await;
        let (events, on_event) = recorder();

        let reply = bridge.send("hi", on_event).await.unwrap();

        assert_eq!(reply, "Hello");
        assert_eq!(
            *events.lock(),
            vec![
                ChatEvent::Token("Hel".into()),
                ChatEvent::Token("lo".into()),
                ChatEvent::Complete("Hello".into()),
            ]
        );
        assert_eq!(bridge.history(), [ChatMessage::user("hi"), ChatMessage::assistant("Hello")]);
    }

    #[tokio::test]
    async fn test_failure_keeps_only_user_turn() {
        let provider = Arc::new(MockProvider::error_after(["partial"], "boom", Arc::new(NoOpLogger)));
        let mut bridge = bridge(MockTransport::new(), provider).await;
        let (events, on_event) = recorder();

        assert!(bridge.send("hi", on_event).await.is_err());

        let events = events.lock();
        assert_eq!(events[0], ChatEvent::Token("partial".into()));
        assert!(matches!(events.last(), Some(ChatEvent::Error(msg)) if msg.contains("boom")));
        assert_eq!(bridge.history(), [ChatMessage::user("hi")]);
    }

    #[tokio::test]
    async fn test_degraded_skips_model() {
        let provider = Arc::new(MockProvider::fixed("unused", Arc::new(NoOpLogger)));
        let transport = MockTransport::with_tools(["search_artwork"]).fail("search_artwork", Some(404), "gone");
        let mut bridge = bridge(transport, provider.clone()).await;
        let (events, on_event) = recorder();

        let reply = bridge.send("find tulips", on_event).await.unwrap();

        assert_eq!(reply, DEGRADED_REPLY);
        assert!(provider.last_request().is_none());
        assert_eq!(*events.lock(), vec![ChatEvent::Complete(DEGRADED_REPLY.to_string())]);
        assert_eq!(bridge.history().last().unwrap().role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_context_and_history_in_prompt() {
        let provider = Arc::new(MockProvider::fixed("ok", Arc::new(NoOpLogger)));
        let transport = MockTransport::with_tools(["search_artwork"]).respond(
            "search_artwork",
            ToolEnvelope::json(&json!({
                "count": 1,
                "artObjects": [{"objectNumber": "SK-A-2344", "title": "The Milkmaid", "principalOrFirstMaker": "Vermeer"}]
            })),
        );
        let mut bridge = bridge(transport, provider.clone()).await;

        bridge.chat("hello").await.unwrap();
        bridge.chat("find milkmaid").await.unwrap();

        let sent = provider.last_request().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], ChatMessage::user("hello"));
        assert_eq!(sent[1], ChatMessage::assistant("ok"));
        assert!(sent[2].content.contains("\nContext: Found 1 artworks"));
        assert!(sent[2].content.ends_with("\nUser: find milkmaid"));
        assert_eq!(bridge.history()[2], ChatMessage::user("find milkmaid"));
        assert_eq!(bridge.recent().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_keeps_recent() {
        let provider = Arc::new(MockProvider::fixed("ok", Arc::new(NoOpLogger)));
        let transport = MockTransport::with_tools(["search_artwork"]).respond(
            "search_artwork",
            ToolEnvelope::json(&json!({"artObjects": [{"objectNumber": "SK-C-5", "title": "The Night Watch"}]})),
        );
        let mut bridge = bridge(transport, provider).await;

        bridge.chat("search night watch").await.unwrap();
        bridge.reset();

        assert!(bridge.history().is_empty());
        assert_eq!(bridge.recent().len(), 1);
    }

    fn sunflowers_server() -> MockTransport {
        MockTransport::with_tools(["search_artwork", "get_artwork_details"])
            .respond(
                "search_artwork",
                ToolEnvelope::json(&json!({"artObjects": [{
                    "objectNumber": "SK-A-3262",
                    "title": "Sunflowers",
                    "principalOrFirstMaker": "Vincent van Gogh",
                    "webImage": {"url": "https://img/sunflowers.jpg"}
                }]})),
            )
            .respond(
                "get_artwork_details",
                ToolEnvelope::json(&json!({"artObject": {
                    "objectNumber": "SK-A-3262",
                    "title": "Sunflowers",
                    "principalMaker": "Vincent van Gogh"
                }})),
            )
            .fail("get_artwork_details", Some(404), "Request failed with status code 404")
    }

    #[tokio::test]
    async fn test_direct_image_action_skips_intent_matching() {
        let provider = Arc::new(MockProvider::fixed("ok", Arc::new(NoOpLogger)));
        let mut bridge = bridge(sunflowers_server(), provider.clone()).await;

        bridge.chat("find sunflowers").await.unwrap();
        let reply = bridge.chat("show me the image of sunflowers").await.unwrap();

        assert_eq!(reply, "ok");
        let prompt = provider.last_request().unwrap().pop().unwrap().content;
        assert!(prompt.contains("\nAction: Opened the image of \"Sunflowers\" by Vincent van Gogh."));
        assert!(!prompt.contains("Context:"));
    }

    #[tokio::test]
    async fn test_direct_details_action_feeds_context() {
        let provider = Arc::new(MockProvider::fixed("ok", Arc::new(NoOpLogger)));
        let mut bridge = bridge(sunflowers_server(), provider.clone()).await;

        bridge.chat("find sunflowers").await.unwrap();
        let reply = bridge.chat("tell me more details about sunflowers").await.unwrap();

        // a second details call would hit the scripted 404 and degrade
        assert_eq!(reply, "ok");
        let prompt = provider.last_request().unwrap().pop().unwrap().content;
        assert!(prompt.contains("\nAction: Fetched details for \"Sunflowers\" (SK-A-3262)."));
        assert!(prompt.contains("\nContext: \"Sunflowers\" by Vincent van Gogh"));
    }

    #[test]
    fn test_build_prompt_order() {
        assert_eq!(
            build_prompt(Some("did it"), Some("ctx"), "q"),
            format!("System: {}\nAction: did it\nContext: ctx\nUser: q", FRAMING)
        );
    }
}
