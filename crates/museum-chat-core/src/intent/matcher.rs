//! Trigger-phrase intent matcher

use crate::tools::names;
use crate::types::{ToolDescriptor, ToolIntent};

use super::extract::{self, ArgumentExtractor};

/// Decides which single tool a message targets
pub trait IntentMatcher: Send + Sync {
    /// Pick a tool from `tools` and synthesize its arguments.
    ///
    /// `None` means no tool applies and the caller answers without one.
    fn match_intent(&self, message: &str, tools: &[ToolDescriptor]) -> Option<ToolIntent>;
}

/// Trigger phrases and argument rule for one tool
#[derive(Debug, Clone)]
pub struct TriggerRule {
    pub tool: String,
    /// Lower-cased substrings
    pub phrases: Vec<String>,
    pub extract: ArgumentExtractor,
}

impl TriggerRule {
    pub fn new<I, S>(tool: impl Into<String>, phrases: I, extract: ArgumentExtractor) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tool: tool.into(),
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
            extract,
        }
    }

    /// True when the lower-cased message contains any phrase
    pub fn triggers(&self, lowered: &str) -> bool {
        self.phrases.iter().any(|p| lowered.contains(p.as_str()))
    }
}

/// Matches a tool when the message contains one of its trigger phrases.
///
/// Tools are tried in registry order and the first hit wins. There is no
/// scoring, so two tools sharing a phrase resolve by that order alone.
#[derive(Debug, Clone, Default)]
pub struct TriggerPhraseMatcher {
    rules: Vec<TriggerRule>,
}

impl TriggerPhraseMatcher {
    pub fn new(rules: Vec<TriggerRule>) -> Self {
        Self { rules }
    }

    /// Trigger table for the collection server's tools
    pub fn museum_defaults() -> Self {
        Self::new(vec![
            TriggerRule::new(
                names::SEARCH_ARTWORK,
                [
                    "find",
                    "search",
                    "look for",
                    "looking for",
                    "show me",
                    "artworks by",
                    "paintings by",
                    "works by",
                ],
                extract::search_arguments,
            ),
            TriggerRule::new(
                names::GET_ARTWORK_DETAILS,
                ["details", "tell me about", "information about", "more about", "describe"],
                extract::object_arguments,
            ),
            TriggerRule::new(
                names::GET_ARTWORK_IMAGE,
                ["image of", "picture of", "high resolution", "zoom"],
                extract::object_arguments,
            ),
            TriggerRule::new(
                names::GET_USER_SETS,
                ["user sets", "collections", "curated sets"],
                extract::user_sets_arguments,
            ),
            TriggerRule::new(
                names::GET_USER_SET_DETAILS,
                ["set details", "collection details", "inside set"],
                extract::set_details_arguments,
            ),
            TriggerRule::new(
                names::OPEN_IMAGE_IN_BROWSER,
                ["open image", "open in browser", "open the image"],
                extract::open_image_arguments,
            ),
            TriggerRule::new(
                names::GET_ARTIST_TIMELINE,
                ["timeline", "chronolog", "career of"],
                extract::timeline_arguments,
            ),
        ])
    }

    /// Add a rule, replacing any existing rule for the same tool
    pub fn with_rule(mut self, rule: TriggerRule) -> Self {
        match self.rules.iter_mut().find(|r| r.tool == rule.tool) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }

    pub fn rule(&self, tool: &str) -> Option<&TriggerRule> {
        self.rules.iter().find(|r| r.tool == tool)
    }
}

impl IntentMatcher for TriggerPhraseMatcher {
    fn match_intent(&self, message: &str, tools: &[ToolDescriptor]) -> Option<ToolIntent> {
        let lowered = message.to_lowercase();

        tools.iter().find_map(|tool| {
            let rule = self.rule(&tool.name)?;
            rule.triggers(&lowered)
                .then(|| ToolIntent::new(tool.name.clone(), (rule.extract)(message)))
        })
    }
}
