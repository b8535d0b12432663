//! End-to-end conversations over a scripted collection server and a mock model

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use museum_chat_core::context::DEGRADED_REPLY;
use museum_chat_core::providers::{MockProvider, ProviderModelConfig};
use museum_chat_core::tools::MockTransport;
use museum_chat_core::types::ToolEnvelope;
use museum_chat_core::{ChatEvent, Logger, MuseumSession, NoOpLogger, ResourceOpener, UiEvent};

#[derive(Default)]
struct RecordingOpener(Mutex<Vec<String>>);

impl ResourceOpener for RecordingOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        self.0.lock().push(url.to_string());
        Ok(())
    }
}

fn collection_server() -> MockTransport {
    MockTransport::with_tools([
        "search_artwork",
        "get_artwork_details",
        "get_artwork_image",
        "open_image_in_browser",
    ])
    .respond(
        "search_artwork",
        ToolEnvelope::json(&json!({
            "count": 1,
            "artObjects": [{
                "objectNumber": "SK-A-3262",
                "title": "Sunflowers",
                "principalOrFirstMaker": "Vincent van Gogh",
                "webImage": {"url": "https://lh3.example/sunflowers.jpg"}
            }]
        })),
    )
    .fail("get_artwork_details", Some(404), "Request failed with status code 404")
}

struct Harness {
    session: MuseumSession,
    transport: Arc<MockTransport>,
    provider: Arc<MockProvider>,
    opener: Arc<RecordingOpener>,
}

async fn harness(transport: MockTransport, provider: MockProvider) -> Harness {
    let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
    let transport = Arc::new(transport);
    let provider = Arc::new(provider);
    let opener = Arc::new(RecordingOpener::default());

    let session = MuseumSession::from_parts(
        transport.clone(),
        provider.clone(),
        ProviderModelConfig::new("mock-model"),
        opener.clone(),
        logger,
    )
    .await
    .unwrap();

    Harness {
        session,
        transport,
        provider,
        opener,
    }
}

async fn send(session: &mut MuseumSession, message: &str) -> (Result<String, String>, Vec<ChatEvent>) {
    let mut events = Vec::new();
    let result = session
        .send_chat_message(message, |event| events.push(event))
        .await
        .map_err(|e| e.to_string());
    (result, events)
}

#[tokio::test]
async fn test_search_then_open_image_from_recent() {
    let mut h = harness(collection_server(), MockProvider::echo(Arc::new(NoOpLogger))).await;

    let (reply, events) = send(&mut h.session, "find sunflowers").await;
    let reply = reply.unwrap();

    assert_eq!(
        h.transport.calls()[0],
        (
            "search_artwork".to_string(),
            json!({"query": "sunflowers", "pageSize": 10, "imgonly": true, "s": "relevance"})
        )
    );
    assert!(reply.contains("Context: Found 1 artworks (showing 1):"));
    assert!(reply.contains("1. \"Sunflowers\" by Vincent van Gogh (SK-A-3262)"));
    assert!(reply.ends_with("User: find sunflowers"));
    assert_eq!(events.last(), Some(&ChatEvent::Complete(reply.clone())));
    assert_eq!(h.session.recent().len(), 1);

    let (reply, _) = send(&mut h.session, "show me the image of sunflowers").await;

    assert_eq!(*h.opener.0.lock(), vec!["https://lh3.example/sunflowers.jpg".to_string()]);
    let reply = reply.unwrap();
    assert!(reply.contains("Action: Opened the image of \"Sunflowers\" by Vincent van Gogh."));
    assert!(!reply.contains("Context:"));
    // the action answered the message; nothing else went to the server
    assert_eq!(h.transport.calls().len(), 1);
    assert_eq!(h.session.history().len(), 4);
}

#[tokio::test]
async fn test_failing_tool_cannot_degrade_a_completed_action() {
    // a second search would fail, so any intent-matched call would degrade the turn
    let transport = collection_server().fail("search_artwork", Some(404), "Request failed with status code 404");
    let mut h = harness(transport, MockProvider::echo(Arc::new(NoOpLogger))).await;

    send(&mut h.session, "find sunflowers").await.0.unwrap();
    let (reply, events) = send(&mut h.session, "show me the image of sunflowers").await;

    let reply = reply.unwrap();
    assert_ne!(reply, DEGRADED_REPLY);
    assert!(reply.contains("Action: Opened the image of \"Sunflowers\""));
    assert_eq!(h.opener.0.lock().len(), 1);
    assert_eq!(h.transport.call_count("search_artwork"), 1);
    assert!(matches!(events.last(), Some(ChatEvent::Complete(r)) if *r == reply));
}

#[tokio::test]
async fn test_more_details_uses_cached_object_number() {
    let transport = MockTransport::with_tools(["search_artwork", "get_artwork_details"])
        .respond(
            "search_artwork",
            ToolEnvelope::json(&json!({
                "artObjects": [{"objectNumber": "SK-A-3262", "title": "Sunflowers", "principalOrFirstMaker": "Vincent van Gogh"}]
            })),
        )
        .respond(
            "get_artwork_details",
            ToolEnvelope::json(&json!({
                "artObject": {"objectNumber": "SK-A-3262", "title": "Sunflowers", "principalMaker": "Vincent van Gogh"}
            })),
        )
        .fail("get_artwork_details", Some(404), "Request failed with status code 404");
    let mut h = harness(transport, MockProvider::echo(Arc::new(NoOpLogger))).await;

    send(&mut h.session, "find sunflowers").await.0.unwrap();
    let (reply, _) = send(&mut h.session, "tell me more details about sunflowers").await;

    let details_calls: Vec<_> = h
        .transport
        .calls()
        .into_iter()
        .filter(|(tool, _)| tool == "get_artwork_details")
        .collect();
    assert_eq!(
        details_calls,
        vec![("get_artwork_details".to_string(), json!({"objectNumber": "SK-A-3262"}))]
    );

    let reply = reply.unwrap();
    assert_ne!(reply, DEGRADED_REPLY);
    assert!(reply.contains("Action: Fetched details for \"Sunflowers\" (SK-A-3262)."));
    assert!(reply.contains("Context: \"Sunflowers\" by Vincent van Gogh"));
}

#[tokio::test]
async fn test_failed_tool_degrades_without_model_call() {
    let mut h = harness(collection_server(), MockProvider::echo(Arc::new(NoOpLogger))).await;

    let (reply, events) = send(&mut h.session, "tell me about SK-C-5").await;

    assert_eq!(reply.unwrap(), DEGRADED_REPLY);
    assert_eq!(events, vec![ChatEvent::Complete(DEGRADED_REPLY.to_string())]);
    assert_eq!(h.transport.call_count("get_artwork_details"), 1);
    assert!(h.provider.last_request().is_none());

    let history = h.session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "tell me about SK-C-5");
    assert_eq!(history[1].content, DEGRADED_REPLY);
}

#[tokio::test]
async fn test_stream_error_reaches_the_ui() {
    let provider = MockProvider::error_after(["Par"], "rate limited", Arc::new(NoOpLogger));
    let mut h = harness(collection_server(), provider).await;

    let (reply, events) = send(&mut h.session, "hello there").await;

    let err = reply.unwrap_err();
    assert!(err.contains("rate limited"));
    assert_eq!(events[0], ChatEvent::Token("Par".to_string()));

    let ui: Vec<_> = events.into_iter().map(|e| UiEvent::from(e).to_json()).collect();
    assert_eq!(ui[0], json!({"type": "chat-token", "token": "Par"}));
    assert_eq!(ui[1]["type"], "chat-error");
    assert_eq!(ui.len(), 2);

    // the user turn stays, no assistant turn is recorded
    assert_eq!(h.session.history().len(), 1);
}

#[tokio::test]
async fn test_plain_chat_sends_framing_and_message_only() {
    let mut h = harness(collection_server(), MockProvider::fixed("Hi!", Arc::new(NoOpLogger))).await;

    let (reply, _) = send(&mut h.session, "hello").await;
    assert_eq!(reply.unwrap(), "Hi!");
    assert!(h.transport.calls().is_empty());

    let sent = h.provider.last_request().unwrap();
    let prompt = &sent.last().unwrap().content;
    assert!(prompt.starts_with("System: "));
    assert!(!prompt.contains("Context:"));
    assert!(!prompt.contains("Action:"));
    assert!(prompt.ends_with("\nUser: hello"));

    h.session.clear_chat();
    assert!(h.session.history().is_empty());
    assert_eq!(h.session.tools().len(), 4);
}
