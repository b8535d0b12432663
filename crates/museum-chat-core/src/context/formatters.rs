//! Tool result formatting
//!
//! Each formatter turns one tool's output into prose for the model prompt.
//! Formatters are infallible: missing fields and empty results render as
//! "not found" text.

use std::collections::HashMap;

use serde_json::Value;

use crate::tools::names;
use crate::types::ToolOutput;

/// Renders one tool's output as prose
pub type Formatter = fn(&ToolOutput) -> String;

/// Tool name → formatter, with a generic fallback
#[derive(Debug, Clone, Default)]
pub struct FormatterTable {
    formatters: HashMap<String, Formatter>,
}

impl FormatterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatters for the collection server's tools
    pub fn museum_defaults() -> Self {
        Self::new()
            .with(names::SEARCH_ARTWORK, format_search)
            .with(names::GET_ARTWORK_DETAILS, format_details)
            .with(names::GET_ARTWORK_IMAGE, format_image)
            .with(names::GET_USER_SETS, format_user_sets)
            .with(names::GET_USER_SET_DETAILS, format_set_details)
            .with(names::OPEN_IMAGE_IN_BROWSER, format_open_image)
            .with(names::GET_ARTIST_TIMELINE, format_timeline)
    }

    pub fn with(mut self, tool: impl Into<String>, formatter: Formatter) -> Self {
        self.formatters.insert(tool.into(), formatter);
        self
    }

    pub fn contains(&self, tool: &str) -> bool {
        self.formatters.contains_key(tool)
    }

    pub fn format(&self, tool: &str, output: &ToolOutput) -> String {
        match self.formatters.get(tool) {
            Some(formatter) => formatter(output),
            None => format_generic(tool, output),
        }
    }
}

/// Rendering for tools without a dedicated formatter
pub fn format_generic(tool: &str, output: &ToolOutput) -> String {
    format!("Result from {}: {}", tool, output.render())
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn maker(value: &Value) -> &str {
    str_field(value, "principalOrFirstMaker")
        .or_else(|| str_field(value, "principalMaker"))
        .unwrap_or("Unknown artist")
}

/// Plain text outputs are passed through; an empty one reads as "not found"
fn text_or(output: &ToolOutput, not_found: &str) -> String {
    match output {
        ToolOutput::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => not_found.to_string(),
    }
}

fn format_search(output: &ToolOutput) -> String {
    let Some(data) = output.as_json() else {
        return text_or(output, "No artworks were found for this search.");
    };

    let objects = array_field(data, "artObjects");
    if objects.is_empty() {
        return "No artworks were found for this search.".to_string();
    }

    let total = data
        .get("count")
        .and_then(Value::as_u64)
        .unwrap_or(objects.len() as u64);

    let mut lines = vec![format!(
        "Found {} artworks (showing {}):",
        total,
        objects.len()
    )];
    for (i, art) in objects.iter().enumerate() {
        lines.push(format!(
            "{}. \"{}\" by {} ({})",
            i + 1,
            str_field(art, "title").unwrap_or("Untitled"),
            maker(art),
            str_field(art, "objectNumber").unwrap_or("no object number"),
        ));
    }
    lines.join("\n")
}

fn format_details(output: &ToolOutput) -> String {
    let Some(data) = output.as_json() else {
        return text_or(output, "The artwork details were not found.");
    };

    let art = data.get("artObject").unwrap_or(data);
    let Some(title) = str_field(art, "title") else {
        return "The artwork details were not found.".to_string();
    };

    let mut lines = vec![format!("\"{}\" by {}", title, maker(art))];

    if let Some(number) = str_field(art, "objectNumber") {
        lines.push(format!("Object number: {}", number));
    }
    if let Some(date) = art.get("dating").and_then(|d| str_field(d, "presentingDate")) {
        lines.push(format!("Date: {}", date));
    }
    if let Some(medium) = str_field(art, "physicalMedium") {
        lines.push(format!("Medium: {}", medium));
    }
    let dimensions: Vec<String> = array_field(art, "dimensions")
        .iter()
        .filter_map(|d| {
            let kind = str_field(d, "type")?;
            let value = d.get("value").map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })?;
            let unit = str_field(d, "unit").unwrap_or("");
            Some(format!("{} {}{}", kind, value, unit))
        })
        .collect();
    if !dimensions.is_empty() {
        lines.push(format!("Dimensions: {}", dimensions.join(", ")));
    }
    if let Some(description) = str_field(art, "plaqueDescriptionEnglish")
        .or_else(|| str_field(art, "description"))
    {
        lines.push(format!("Description: {}", description));
    }

    lines.join("\n")
}

fn format_image(output: &ToolOutput) -> String {
    let Some(data) = output.as_json() else {
        return text_or(output, "No image information was found for this artwork.");
    };

    let levels = array_field(data, "levels");
    if levels.is_empty() {
        return match data
            .get("webImage")
            .and_then(|img| str_field(img, "url"))
            .or_else(|| str_field(data, "url"))
        {
            Some(url) => format!("Image available at {}", url),
            None => "No image information was found for this artwork.".to_string(),
        };
    }

    let mut lines = vec![format!("The image is available in {} zoom levels:", levels.len())];
    for level in levels {
        let name = str_field(level, "name").unwrap_or("level");
        let width = level.get("width").and_then(Value::as_u64).unwrap_or(0);
        let height = level.get("height").and_then(Value::as_u64).unwrap_or(0);
        let tiles = array_field(level, "tiles").len();
        lines.push(format!("- {}: {}x{} pixels, {} tiles", name, width, height, tiles));
    }
    lines.join("\n")
}

fn format_user_sets(output: &ToolOutput) -> String {
    let Some(data) = output.as_json() else {
        return text_or(output, "No user sets were found.");
    };

    let sets = array_field(data, "userSets");
    if sets.is_empty() {
        return "No user sets were found.".to_string();
    }

    let mut lines = vec![format!("Found {} user sets:", sets.len())];
    for set in sets {
        let name = str_field(set, "name").unwrap_or("Unnamed set");
        let id = str_field(set, "id").unwrap_or("no id");
        let owner = set
            .get("user")
            .and_then(|u| str_field(u, "name"))
            .map(|n| format!(" by {}", n))
            .unwrap_or_default();
        let count = set
            .get("count")
            .and_then(Value::as_u64)
            .map(|c| format!(", {} items", c))
            .unwrap_or_default();
        lines.push(format!("- {} ({}){}{}", name, id, owner, count));
    }
    lines.join("\n")
}

fn format_set_details(output: &ToolOutput) -> String {
    let Some(data) = output.as_json() else {
        return text_or(output, "The user set was not found.");
    };

    let Some(set) = data.get("userSet").filter(|s| s.is_object()) else {
        return "The user set was not found.".to_string();
    };

    let mut lines = vec![format!(
        "User set \"{}\"",
        str_field(set, "name").unwrap_or("Unnamed set")
    )];
    if let Some(description) = str_field(set, "description") {
        lines.push(description.to_string());
    }

    let items = array_field(set, "setItems");
    if items.is_empty() {
        lines.push("The set contains no artworks.".to_string());
    } else {
        lines.push(format!("Contains {} artworks:", items.len()));
        for item in items {
            lines.push(format!(
                "- \"{}\" by {} ({})",
                str_field(item, "title").unwrap_or("Untitled"),
                maker(item),
                str_field(item, "objectNumber").unwrap_or("no object number"),
            ));
        }
    }
    lines.join("\n")
}

fn format_open_image(output: &ToolOutput) -> String {
    match output {
        ToolOutput::Json(data) => match str_field(data, "message").or_else(|| str_field(data, "url")) {
            Some(text) => format!("Image opened in the browser: {}", text),
            None => "The image was opened in the browser.".to_string(),
        },
        ToolOutput::Text(_) => text_or(output, "The image could not be found to open."),
    }
}

fn format_timeline(output: &ToolOutput) -> String {
    let Some(data) = output.as_json() else {
        return text_or(output, "No timeline was found for this artist.");
    };

    let entries = array_field(data, "timeline");
    if entries.is_empty() {
        return "No timeline was found for this artist.".to_string();
    }

    let artist = str_field(data, "artist").unwrap_or("the artist");
    let mut lines = vec![format!("Timeline of {}:", artist)];
    for entry in entries {
        let year = match entry.get("year") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => "Undated".to_string(),
        };
        lines.push(format!(
            "- {}: \"{}\" ({})",
            year,
            str_field(entry, "title").unwrap_or("Untitled"),
            str_field(entry, "objectNumber").unwrap_or("no object number"),
        ));
    }
    lines.join("\n")
}
