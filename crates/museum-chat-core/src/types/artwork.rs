//! Artwork records returned by the collection tools

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fields of a museum object the client keeps around between turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkSummary {
    /// Collection identifier, e.g. `SK-C-5`
    pub object_number: String,
    pub title: String,
    /// Principal maker or "Unknown artist"
    pub maker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ArtworkSummary {
    pub fn new(
        object_number: impl Into<String>,
        title: impl Into<String>,
        maker: impl Into<String>,
    ) -> Self {
        Self {
            object_number: object_number.into(),
            title: title.into(),
            maker: maker.into(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Read a collection API art object. Returns `None` without an object number.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object_number = value.get("objectNumber")?.as_str()?.trim();
        if object_number.is_empty() {
            return None;
        }

        let title = value
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled");

        let maker = ["principalOrFirstMaker", "principalMaker"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(Value::as_str))
            .find(|m| !m.is_empty())
            .unwrap_or("Unknown artist");

        let image_url = value
            .get("webImage")
            .and_then(|img| img.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            object_number: object_number.to_string(),
            title: title.to_string(),
            maker: maker.to_string(),
            image_url,
        })
    }

    /// Case-insensitive substring match against title or maker
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.title.to_lowercase().contains(&needle) || self.maker.to_lowercase().contains(&needle)
    }
}

/// Result of a details lookup, as shown in the artwork panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ArtworkSummary>,
    /// Human-readable rendering of the details
    pub text: String,
    /// Raw tool payload
    pub raw: Value,
}
