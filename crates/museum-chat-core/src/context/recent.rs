//! Recently seen artworks

use serde_json::Value;

use crate::types::ArtworkSummary;

/// Artworks returned by earlier tool calls.
///
/// Ordered by recency, newest last, and unique by object number. An upsert
/// of a known object number replaces the entry and moves it to the end.
#[derive(Debug, Clone, Default)]
pub struct RecentArtworks {
    entries: Vec<ArtworkSummary>,
}

impl RecentArtworks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, artwork: ArtworkSummary) {
        self.entries
            .retain(|e| e.object_number != artwork.object_number);
        self.entries.push(artwork);
    }

    /// Upsert every art object found in a search or details payload.
    /// Returns how many records were read.
    pub fn absorb(&mut self, payload: &Value) -> usize {
        let records = artwork_records(payload);
        let count = records.len();
        for artwork in records {
            self.upsert(artwork);
        }
        count
    }

    /// Newest matching entry for a title or maker fragment
    pub fn find(&self, needle: &str) -> Option<&ArtworkSummary> {
        self.entries.iter().rev().find(|e| e.matches(needle))
    }

    pub fn get(&self, object_number: &str) -> Option<&ArtworkSummary> {
        self.entries
            .iter()
            .find(|e| e.object_number.eq_ignore_ascii_case(object_number))
    }

    pub fn snapshot(&self) -> Vec<ArtworkSummary> {
        self.entries.clone()
    }

    pub fn as_slice(&self) -> &[ArtworkSummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Art object records in a collection payload: `artObjects` (search),
/// `artObject` (details) or a bare object.
pub fn artwork_records(payload: &Value) -> Vec<ArtworkSummary> {
    if let Some(list) = payload.get("artObjects").and_then(Value::as_array) {
        return list.iter().filter_map(ArtworkSummary::from_json).collect();
    }

    let single = payload.get("artObject").unwrap_or(payload);
    ArtworkSummary::from_json(single).into_iter().collect()
}
