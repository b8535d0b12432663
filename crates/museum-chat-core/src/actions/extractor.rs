//! Imperative shortcuts against recently seen artworks
//!
//! "show me the image of the milkmaid" opens the cached image URL without
//! a tool round trip; "tell me more about the milkmaid" fetches details for
//! the cached object number.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::logging::Logger;
use crate::tools::{names, ToolInvoker};
use crate::types::{ArtworkSummary, ToolOutput};

use super::opener::ResourceOpener;

static IMAGE_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:show|open|view|display)\s+(?:me\s+)?(?:the\s+)?(?:image|picture|photo)\s+of\s+(.+)",
    )
    .expect("image request pattern is valid")
});

static DETAILS_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:tell|show|give)\s+me\s+(?:the\s+)?(?:more\s+)?(?:details|information|info)\s+(?:about|on|of|for)\s+(.+)",
    )
    .expect("details request pattern is valid")
});

static LEADING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:the|a|an)\s+").expect("article pattern is valid"));

/// A shortcut that was carried out
#[derive(Debug, Clone, PartialEq)]
pub struct DirectAction {
    /// One-line confirmation for the prompt
    pub summary: String,
    /// Tool output fetched by the action, so the caller can cache it
    pub fetched: Option<(String, ToolOutput)>,
}

/// Recognizes imperative phrasings and runs them directly
pub struct DirectActionExtractor {
    invoker: Arc<ToolInvoker>,
    opener: Arc<dyn ResourceOpener>,
    logger: Arc<dyn Logger>,
}

impl DirectActionExtractor {
    pub fn new(
        invoker: Arc<ToolInvoker>,
        opener: Arc<dyn ResourceOpener>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            invoker,
            opener,
            logger,
        }
    }

    /// Try the shortcuts against `recent`.
    ///
    /// `None` covers no recognized phrasing, no cached artwork and a failed
    /// action alike.
    pub async fn try_direct_action(
        &self,
        message: &str,
        recent: &[ArtworkSummary],
    ) -> Option<DirectAction> {
        if let Some(target) = capture(&IMAGE_REQUEST, message) {
            return self.open_image(&target, recent);
        }
        if let Some(target) = capture(&DETAILS_REQUEST, message) {
            return self.fetch_details(&target, recent).await;
        }
        None
    }

    fn open_image(&self, target: &str, recent: &[ArtworkSummary]) -> Option<DirectAction> {
        let artwork = find_recent(recent, target)?;
        let Some(url) = artwork.image_url.as_deref() else {
            self.logger.debug(&format!(
                "[DirectAction] {} has no image URL",
                artwork.object_number
            ));
            return None;
        };

        if let Err(e) = self.opener.open(url) {
            self.logger.error(&format!("[DirectAction] Failed to open {}: {}", url, e));
            return None;
        }

        self.logger.info(&format!("[DirectAction] Opened image for {}", artwork.object_number));
        Some(DirectAction {
            summary: format!("Opened the image of \"{}\" by {}.", artwork.title, artwork.maker),
            fetched: None,
        })
    }

    async fn fetch_details(&self, target: &str, recent: &[ArtworkSummary]) -> Option<DirectAction> {
        let artwork = find_recent(recent, target)?;

        let output = match self
            .invoker
            .invoke(
                names::GET_ARTWORK_DETAILS,
                json!({ "objectNumber": artwork.object_number }),
            )
            .await
        {
            Ok(output) => output,
            Err(e) => {
                self.logger.error(&format!(
                    "[DirectAction] Details for {} failed: {}",
                    artwork.object_number, e
                ));
                return None;
            }
        };

        Some(DirectAction {
            summary: format!(
                "Fetched details for \"{}\" ({}).",
                artwork.title, artwork.object_number
            ),
            fetched: Some((names::GET_ARTWORK_DETAILS.to_string(), output)),
        })
    }
}

/// Target phrase of a request, without quotes, trailing punctuation or a
/// leading article
fn capture(pattern: &Regex, message: &str) -> Option<String> {
    let raw = pattern.captures(message)?.get(1)?.as_str();
    let trimmed = raw.trim().trim_matches(|c: char| {
        matches!(c, '"' | '\'' | '“' | '”' | '.' | '!' | '?' | ',')
    });
    let target = LEADING_ARTICLE.replace(trimmed.trim(), "").trim().to_string();
    (!target.is_empty()).then_some(target)
}

/// Newest cached artwork whose title or maker contains the target
fn find_recent<'a>(recent: &'a [ArtworkSummary], target: &str) -> Option<&'a ArtworkSummary> {
    recent.iter().rev().find(|a| a.matches(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::tools::{MockTransport, RetryPolicy};
    use crate::types::ToolEnvelope;
    use parking_lot::Mutex;
    use std::io;

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ResourceOpener for RecordingOpener {
        fn open(&self, url: &str) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no handler"));
            }
            self.opened.lock().push(url.to_string());
            Ok(())
        }
    }

    fn extractor(transport: &Arc<MockTransport>, opener: &Arc<RecordingOpener>) -> DirectActionExtractor {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
        let invoker = ToolInvoker::new(transport.clone(), logger.clone()).with_policy(RetryPolicy::none());
        DirectActionExtractor::new(Arc::new(invoker), opener.clone(), logger)
    }

    fn recent() -> Vec<ArtworkSummary> {
        vec![
            ArtworkSummary::new("SK-A-2344", "The Milkmaid", "Johannes Vermeer")
                .with_image_url("https://img/milkmaid.jpg"),
            ArtworkSummary::new("SK-C-5", "The Night Watch", "Rembrandt van Rijn"),
        ]
    }

    #[tokio::test]
    async fn test_open_image_from_cache() {
        let transport = Arc::new(MockTransport::new());
        let opener = Arc::new(RecordingOpener::default());

        let action = extractor(&transport, &opener)
            .try_direct_action("Show me the image of the Milkmaid!", &recent())
            .await
            .unwrap();

        assert_eq!(action.summary, "Opened the image of \"The Milkmaid\" by Johannes Vermeer.");
        assert!(action.fetched.is_none());
        assert_eq!(*opener.opened.lock(), vec!["https://img/milkmaid.jpg".to_string()]);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_image_without_url_is_none() {
        let transport = Arc::new(MockTransport::new());
        let opener = Arc::new(RecordingOpener::default());

        let action = extractor(&transport, &opener)
            .try_direct_action("open the picture of night watch", &recent())
            .await;
        assert!(action.is_none());
        assert!(opener.opened.lock().is_empty());
    }

    #[tokio::test]
    async fn test_opener_failure_is_none() {
        let transport = Arc::new(MockTransport::new());
        let opener = Arc::new(RecordingOpener {
            fail: true,
            ..Default::default()
        });

        let action = extractor(&transport, &opener)
            .try_direct_action("display image of vermeer", &recent())
            .await;
        assert!(action.is_none());
    }

    #[tokio::test]
    async fn test_fetch_details_from_cache() {
        let transport = Arc::new(MockTransport::new().respond(
            "get_artwork_details",
            ToolEnvelope::json(&json!({"artObject": {"objectNumber": "SK-C-5", "title": "The Night Watch"}})),
        ));
        let opener = Arc::new(RecordingOpener::default());

        let action = extractor(&transport, &opener)
            .try_direct_action("tell me more details about rembrandt", &recent())
            .await
            .unwrap();

        assert_eq!(action.summary, "Fetched details for \"The Night Watch\" (SK-C-5).");
        let (tool, output) = action.fetched.unwrap();
        assert_eq!(tool, "get_artwork_details");
        assert!(output.as_json().is_some());
        assert_eq!(
            transport.calls(),
            vec![("get_artwork_details".to_string(), json!({"objectNumber": "SK-C-5"}))]
        );
    }

    #[tokio::test]
    async fn test_failed_details_is_none() {
        let transport = Arc::new(MockTransport::new().fail("get_artwork_details", Some(404), "gone"));
        let opener = Arc::new(RecordingOpener::default());

        let action = extractor(&transport, &opener)
            .try_direct_action("give me information about the milkmaid", &recent())
            .await;
        assert!(action.is_none());
        assert_eq!(transport.call_count("get_artwork_details"), 1);
    }

    #[tokio::test]
    async fn test_no_phrase_or_no_cache_entry() {
        let transport = Arc::new(MockTransport::new());
        let opener = Arc::new(RecordingOpener::default());
        let extractor = extractor(&transport, &opener);

        assert!(extractor.try_direct_action("find sunflowers", &recent()).await.is_none());
        assert!(extractor
            .try_direct_action("show me the image of sunflowers", &recent())
            .await
            .is_none());
        assert!(extractor
            .try_direct_action("tell me about the milkmaid", &[])
            .await
            .is_none());
    }

    #[test]
    fn test_capture_cleans_target() {
        assert_eq!(
            capture(&IMAGE_REQUEST, "view photo of \"The Milkmaid\".").as_deref(),
            Some("Milkmaid")
        );
        assert_eq!(capture(&IMAGE_REQUEST, "show me the image of ?"), None);
    }
}
