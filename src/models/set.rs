use serde::{Deserialize, Serialize};

use crate::models::card::ApiCard;

// ---------------------------------------------------------------------------
// SetDefinition — operator-authored set descriptor
// ---------------------------------------------------------------------------

/// Curated stand-in for a card the API never returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderSpec {
    pub number: u32,
    pub name: String,
}

/// Static description of a tracked set.
///
/// `expected_total` is the authoritative progress denominator and is
/// deliberately independent of how many cards the API actually exposes.
/// Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDefinition {
    /// Short unique identifier, stored lowercase.
    pub code: String,
    pub name: String,
    pub expected_total: u32,
    /// Collector numbers known to be absent from primary discovery.
    #[serde(default)]
    pub missing_numbers: Vec<u32>,
    /// Stand-ins for numbers no query can resolve.
    #[serde(default)]
    pub placeholders: Vec<PlaceholderSpec>,
}

impl SetDefinition {
    /// The curated placeholder name for a collector number, if one exists.
    pub fn placeholder_name(&self, number: u32) -> Option<&str> {
        self.placeholders
            .iter()
            .find(|p| p.number == number)
            .map(|p| p.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// SearchPage — one page of an API response
// ---------------------------------------------------------------------------

/// A single page from the search or set-listing endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total_cards: Option<u32>,
    #[serde(default)]
    pub has_more: bool,
    /// Continuation pointer for the next page, absent on the last page.
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub data: Vec<ApiCard>,
}

impl SearchPage {
    /// The continuation token, only when the API also signals more pages.
    pub fn continuation(&self) -> Option<&str> {
        if self.has_more {
            self.next_page.as_deref()
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// SetMetadata — set-metadata endpoint payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetMetadata {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub card_count: Option<u32>,
    #[serde(default)]
    pub parent_set_code: Option<String>,
}
