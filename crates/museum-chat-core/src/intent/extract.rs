//! Argument extraction from free text
//!
//! Each tool has its own rule for turning a user message into call
//! arguments. Extraction never fails: when nothing specific is found the
//! whole message becomes the salient value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

/// Page size used for search-like tools
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Signature shared by all extractors
pub type ArgumentExtractor = fn(&str) -> Value;

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("extraction pattern is valid")
}

/// Collection object numbers: `SK-C-5`, `SK-A-3262`, `RP-P-1906-2550`, `BK-16676`
static OBJECT_NUMBER: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b[a-z]{1,4}(?:-[a-z0-9]+)*-\d+[a-z0-9]*\b"));

/// User set identifiers: `<user id>-<slug>`
static SET_ID: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)\b\d+-[a-z0-9][a-z0-9-]*\b"));

static URL: Lazy<Regex> = Lazy::new(|| pattern(r#"https?://[^\s"'<>]+"#));

static QUOTES: Lazy<Regex> = Lazy::new(|| pattern(r#"["“”«»]|(?:^|\s)['‘]|['’](?:\s|$)"#));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| pattern(r"\s+"));

static LEADING_ARTICLE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^(?:the|a|an)\s+"));

// Alternations are leftmost-first, so longer phrases come before their prefixes.
static SEARCH_FILLER: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:can you|could you|would you|please|i want to|i'd like to|search for|search|look(?:ing)? for|find me|find|show me|artworks? by|paintings? by|works? by|artworks?|paintings?|works|pieces|related to|about|for me|some|any|of|by)\b",
    )
});

static DETAIL_FILLER: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:can you|could you|please|tell me about|tell me|more about|information about|info about|(?:more )?details (?:about|of|for|on)|details|describe|give me|show me|the artwork|the painting|artwork|painting|image of|picture of|high resolution|zoom(?: in)?(?: on)?|for|of)\b",
    )
});

static SET_FILLER: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:can you|could you|please|show me|what(?:'s| is) inside|inside set|inside|set details (?:for|of)|set details|collection details (?:for|of)|collection details|the set|set|collection|for|of)\b",
    )
});

static TIMELINE_FILLER: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:can you|could you|please|show me|give me|what is|what's|the timeline (?:of|for)|timeline (?:of|for)|timeline|chronological(?:ly)?|chronology (?:of|for)|chronology|career of|career|artist|works (?:of|by)|the|of|for)\b",
    )
});

/// Remove quotes and filler phrases and tidy whitespace.
/// Falls back to the whole message when nothing is left.
fn salient_text(message: &str, filler: &Regex) -> String {
    let unquoted = QUOTES.replace_all(message, " ");
    let stripped = filler.replace_all(&unquoted, " ");
    let collapsed = WHITESPACE.replace_all(stripped.trim(), " ");
    let trimmed = collapsed.trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    let cleaned = LEADING_ARTICLE.replace(trimmed, "");

    if cleaned.is_empty() {
        WHITESPACE.replace_all(message.trim(), " ").into_owned()
    } else {
        cleaned.into_owned()
    }
}

/// Words like `mid-1600s` share the shape; an identifier either has an
/// upper-case prefix as typed or at least two letter segments (`sk-c-5`).
fn is_identifier(token: &str) -> bool {
    let upper_prefix = token
        .split('-')
        .next()
        .is_some_and(|prefix| prefix.chars().all(|c| c.is_ascii_uppercase()));
    let letter_segments = token
        .split('-')
        .take_while(|segment| segment.chars().all(|c| c.is_ascii_alphabetic()))
        .count();
    upper_prefix || letter_segments >= 2
}

/// First object-number-shaped token, upper-cased
pub fn object_number(message: &str) -> Option<String> {
    OBJECT_NUMBER
        .find_iter(message)
        .map(|m| m.as_str())
        .find(|token| is_identifier(token))
        .map(str::to_uppercase)
}

/// Search arguments for an already-clean query
pub fn search_request(query: &str) -> Value {
    json!({
        "query": query,
        "pageSize": DEFAULT_PAGE_SIZE,
        "imgonly": true,
        "s": "relevance",
    })
}

pub fn search_arguments(message: &str) -> Value {
    search_request(&salient_text(message, &SEARCH_FILLER))
}

/// `{objectNumber}` for details and image tools.
///
/// When no object number is present the value is free text, which the
/// context assembler may resolve against recently seen artworks.
pub fn object_arguments(message: &str) -> Value {
    let object = object_number(message).unwrap_or_else(|| salient_text(message, &DETAIL_FILLER));
    json!({ "objectNumber": object })
}

pub fn user_sets_arguments(_message: &str) -> Value {
    json!({ "page": 1, "pageSize": DEFAULT_PAGE_SIZE })
}

pub fn set_details_arguments(message: &str) -> Value {
    let set_id = SET_ID
        .find(message)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| salient_text(message, &SET_FILLER));
    json!({ "setId": set_id, "page": 1, "pageSize": DEFAULT_PAGE_SIZE })
}

pub fn open_image_arguments(message: &str) -> Value {
    let url = URL
        .find(message)
        .map(|m| m.as_str().trim_end_matches(|c: char| matches!(c, '.' | ',' | ')' | '!' | '?')).to_string())
        .unwrap_or_else(|| message.trim().to_string());
    json!({ "imageUrl": url })
}

pub fn timeline_arguments(message: &str) -> Value {
    json!({
        "artist": salient_text(message, &TIMELINE_FILLER),
        "maxWorks": DEFAULT_PAGE_SIZE,
    })
}
