//! Context assembly: intent → tool call → prose

use std::sync::Arc;

use serde_json::Value;

use crate::intent::{extract, IntentMatcher};
use crate::logging::Logger;
use crate::tools::{names, ToolInvoker};
use crate::types::{ArtworkSummary, ToolDescriptor, ToolIntent, ToolOutput};

use super::formatters::FormatterTable;
use super::recent::RecentArtworks;

/// Reply used when a matched tool fails
pub const DEGRADED_REPLY: &str = "I apologize, but I encountered an error while retrieving \
information from the museum collection. I can still answer from my general knowledge about \
art if you'd like.";

/// What the assembler produced for one message
#[derive(Debug, Clone, PartialEq)]
pub enum ContextOutcome {
    /// No tool applies; the model answers on its own
    NoMatch,
    /// A tool ran and its result was formatted
    Context { tool: String, text: String },
    /// A tool matched but failed; the text is the reply to show as-is
    Degraded(String),
}

impl ContextOutcome {
    /// Context text for the prompt, if any
    pub fn context(&self) -> Option<&str> {
        match self {
            ContextOutcome::Context { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ContextOutcome::Degraded(_))
    }
}

/// Runs the matched tool and turns its result into context text.
///
/// Owns the recent-artwork cache; every write to it goes through here.
pub struct ContextAssembler {
    matcher: Box<dyn IntentMatcher>,
    invoker: Arc<ToolInvoker>,
    formatters: FormatterTable,
    recent: RecentArtworks,
    logger: Arc<dyn Logger>,
}

impl ContextAssembler {
    pub fn new(
        matcher: Box<dyn IntentMatcher>,
        invoker: Arc<ToolInvoker>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            matcher,
            invoker,
            formatters: FormatterTable::museum_defaults(),
            recent: RecentArtworks::new(),
            logger,
        }
    }

    pub fn with_formatters(mut self, formatters: FormatterTable) -> Self {
        self.formatters = formatters;
        self
    }

    pub fn invoker(&self) -> &Arc<ToolInvoker> {
        &self.invoker
    }

    /// Build context for a message. Never fails; tool errors become
    /// [`ContextOutcome::Degraded`].
    pub async fn build_context(&mut self, message: &str, tools: &[ToolDescriptor]) -> ContextOutcome {
        let Some(intent) = self.matcher.match_intent(message, tools) else {
            self.logger.debug("[ContextAssembler] No tool matched");
            return ContextOutcome::NoMatch;
        };

        let intent = self.resolve_from_recent(intent);
        self.logger.info(&format!(
            "[ContextAssembler] Calling {} with {}",
            intent.tool, intent.arguments
        ));

        match self.invoker.invoke(&intent.tool, intent.arguments.clone()).await {
            Ok(output) => {
                self.remember(&intent.tool, &output);
                let text = self.formatters.format(&intent.tool, &output);
                ContextOutcome::Context {
                    tool: intent.tool,
                    text,
                }
            }
            Err(e) => {
                self.logger.warn(&format!(
                    "[ContextAssembler] {} failed, degrading: {}",
                    intent.tool, e
                ));
                ContextOutcome::Degraded(DEGRADED_REPLY.to_string())
            }
        }
    }

    /// Record artworks from a search or details result
    pub fn remember(&mut self, tool: &str, output: &ToolOutput) {
        if tool != names::SEARCH_ARTWORK && tool != names::GET_ARTWORK_DETAILS {
            return;
        }
        if let Some(data) = output.as_json() {
            let count = self.recent.absorb(data);
            if count > 0 {
                self.logger.debug(&format!(
                    "[ContextAssembler] Cached {} artworks ({} known)",
                    count,
                    self.recent.len()
                ));
            }
        }
    }

    /// Format an output with the table's formatter for `tool`
    pub fn format(&self, tool: &str, output: &ToolOutput) -> String {
        self.formatters.format(tool, output)
    }

    pub fn recent(&self) -> Vec<ArtworkSummary> {
        self.recent.snapshot()
    }

    pub fn recent_artworks(&self) -> &RecentArtworks {
        &self.recent
    }

    /// Swap a free-text `objectNumber` for the object number of a cached
    /// artwork whose title or maker contains it.
    fn resolve_from_recent(&self, mut intent: ToolIntent) -> ToolIntent {
        if intent.tool != names::GET_ARTWORK_DETAILS && intent.tool != names::GET_ARTWORK_IMAGE {
            return intent;
        }

        let Some(text) = intent.arg_str("objectNumber") else {
            return intent;
        };
        if extract::object_number(text).is_some() {
            return intent;
        }

        if let Some(artwork) = self.recent.find(text) {
            self.logger.debug(&format!(
                "[ContextAssembler] Resolved \"{}\" to {}",
                text, artwork.object_number
            ));
            intent.arguments["objectNumber"] = Value::String(artwork.object_number.clone());
        }
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::TriggerPhraseMatcher;
    use crate::logging::NoOpLogger;
    use crate::tools::{MockTransport, RetryPolicy};
    use crate::types::ToolEnvelope;
    use serde_json::json;

    fn assembler(transport: &Arc<MockTransport>) -> ContextAssembler {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
        let invoker = ToolInvoker::new(transport.clone(), logger.clone()).with_policy(RetryPolicy::none());
        ContextAssembler::new(
            Box::new(TriggerPhraseMatcher::museum_defaults()),
            Arc::new(invoker),
            logger,
        )
    }

    fn tools(names: &[&str]) -> Vec<ToolDescriptor> {
        names.iter().map(|n| ToolDescriptor::new(*n)).collect()
    }

    fn search_payload() -> Value {
        json!({
            "count": 1,
            "artObjects": [{
                "objectNumber": "SK-C-5",
                "title": "The Night Watch",
                "principalOrFirstMaker": "Rembrandt van Rijn",
                "webImage": {"url": "https://img/nw.jpg"}
            }]
        })
    }

    #[tokio::test]
    async fn test_no_match() {
        let transport = Arc::new(MockTransport::new());
        let mut assembler = assembler(&transport);

        let outcome = assembler.build_context("hello", &tools(&["search_artwork"])).await;
        assert_eq!(outcome, ContextOutcome::NoMatch);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_formats_and_caches() {
        let transport = Arc::new(
            MockTransport::new().respond("search_artwork", ToolEnvelope::json(&search_payload())),
        );
        let mut assembler = assembler(&transport);

        let outcome = assembler
            .build_context("find the night watch", &tools(&["search_artwork"]))
            .await;

        match outcome {
            ContextOutcome::Context { tool, text } => {
                assert_eq!(tool, "search_artwork");
                assert!(text.contains("\"The Night Watch\" by Rembrandt van Rijn (SK-C-5)"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert_eq!(assembler.recent().len(), 1);

        // same result again: still one entry
        assembler
            .build_context("find the night watch", &tools(&["search_artwork"]))
            .await;
        assert_eq!(assembler.recent().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_degrades() {
        let transport = Arc::new(MockTransport::new().fail("search_artwork", Some(404), "nope"));
        let mut assembler = assembler(&transport);

        let outcome = assembler.build_context("find tulips", &tools(&["search_artwork"])).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.context(), None);
        let ContextOutcome::Degraded(text) = outcome else { unreachable!() };
        assert!(text.contains("general knowledge"));
    }

    #[tokio::test]
    async fn test_unknown_tool_renders_generic() {
        let transport = Arc::new(
            MockTransport::new().respond("translate_text", ToolEnvelope::json(&json!({"ok": true}))),
        );
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
        let matcher = TriggerPhraseMatcher::new(vec![crate::intent::TriggerRule::new(
            "translate_text",
            ["translate"],
            extract::search_arguments,
        )]);
        let mut assembler = ContextAssembler::new(
            Box::new(matcher),
            Arc::new(ToolInvoker::new(transport.clone(), logger.clone())),
            logger,
        );

        let outcome = assembler
            .build_context("translate this", &tools(&["translate_text"]))
            .await;
        assert_eq!(outcome.context(), Some("Result from translate_text: {\"ok\":true}"));
    }

    #[tokio::test]
    async fn test_details_resolved_from_recent() {
        let transport = Arc::new(
            MockTransport::new()
                .respond("search_artwork", ToolEnvelope::json(&search_payload()))
                .respond(
                    "get_artwork_details",
                    ToolEnvelope::json(&json!({"artObject": {"objectNumber": "SK-C-5", "title": "The Night Watch"}})),
                ),
        );
        let mut assembler = assembler(&transport);
        let registered = tools(&["search_artwork", "get_artwork_details"]);

        assembler.build_context("search night watch", &registered).await;
        assembler
            .build_context("tell me about the night watch", &registered)
            .await;

        let calls = transport.calls();
        assert_eq!(calls[1].0, "get_artwork_details");
        assert_eq!(calls[1].1, json!({"objectNumber": "SK-C-5"}));
    }

    #[tokio::test]
    async fn test_remember_ignores_other_tools() {
        let transport = Arc::new(MockTransport::new());
        let mut assembler = assembler(&transport);

        assembler.remember("get_user_sets", &ToolOutput::Json(search_payload()));
        assert!(assembler.recent().is_empty());

        assembler.remember("search_artwork", &ToolOutput::Text("not json".into()));
        assert!(assembler.recent().is_empty());

        assembler.remember("search_artwork", &ToolOutput::Json(search_payload()));
        assert_eq!(assembler.recent()[0].object_number, "SK-C-5");
    }
}
