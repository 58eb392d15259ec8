//! Shared test fixtures for the cardbinder integration tests.
//!
//! Provides `MockSource`, a scripted [`CardSource`] that serves canned
//! pages per query/listing, wires continuation tokens between them, and
//! records every call so tests can assert on fetch behavior. Clones share
//! the call log, so a test can keep a handle after boxing the source.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use cardbinder::api::CardSource;
use cardbinder::error::{BinderError, Result};
use cardbinder::models::{ApiCard, ImageUris, SearchPage, SetMetadata};

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// A displayable card record with a direct image.
pub fn api_card(id: &str, name: &str, set: &str, number: &str) -> ApiCard {
    ApiCard {
        id: id.to_string(),
        name: name.to_string(),
        set: set.to_string(),
        collector_number: number.to_string(),
        image_uris: Some(ImageUris {
            normal: Some(format!("https://img.test/{}.jpg", id)),
            ..Default::default()
        }),
        card_faces: None,
    }
}

/// A record with no image anywhere -- not displayable.
pub fn imageless_card(id: &str, name: &str, set: &str, number: &str) -> ApiCard {
    ApiCard {
        id: id.to_string(),
        name: name.to_string(),
        set: set.to_string(),
        collector_number: number.to_string(),
        image_uris: None,
        card_faces: None,
    }
}

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockSource {
    /// First pages, keyed `q:{query}` / `l:{set_code}`.
    first_pages: HashMap<String, SearchPage>,
    /// Continuation pages, keyed by the token wired into `next_page`.
    continuations: HashMap<String, SearchPage>,
    /// Queries that fail with a malformed-response error.
    failing_queries: HashSet<String>,
    /// Set codes whose listing endpoint reports not-found.
    failing_listings: HashSet<String>,
    /// Continuation tokens that fail mid-walk.
    failing_tokens: HashSet<String>,
    /// Set code used for generated endless-pagination cards.
    endless_set: Option<String>,
    metadata: HashMap<String, SetMetadata>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn wire(&mut self, key: &str, pages: Vec<Vec<ApiCard>>, broken_tail: bool) {
        let count = pages.len();
        for (i, data) in pages.into_iter().enumerate() {
            let last = i + 1 == count;
            let token = format!("{}#{}", key, i + 1);
            let page = SearchPage {
                data,
                has_more: !last || broken_tail,
                next_page: if !last {
                    Some(token)
                } else if broken_tail {
                    let broken = format!("{}#broken", key);
                    self.failing_tokens.insert(broken.clone());
                    Some(broken)
                } else {
                    None
                },
                total_cards: None,
            };
            if i == 0 {
                self.first_pages.insert(key.to_string(), page);
            } else {
                self.continuations.insert(format!("{}#{}", key, i), page);
            }
        }
    }

    /// Script a search query's pages, wiring continuations in order.
    pub fn add_search(&mut self, query: &str, pages: Vec<Vec<ApiCard>>) {
        self.wire(&format!("q:{}", query), pages, false);
    }

    /// Script a search whose final continuation token errors mid-walk.
    pub fn add_search_with_broken_tail(&mut self, query: &str, pages: Vec<Vec<ApiCard>>) {
        self.wire(&format!("q:{}", query), pages, true);
    }

    /// Script the set-listing endpoint's pages for a set code.
    pub fn add_listing(&mut self, set_code: &str, pages: Vec<Vec<ApiCard>>) {
        self.wire(&format!("l:{}", set_code), pages, false);
    }

    /// Script a search that always claims more pages, one fresh card each.
    pub fn add_endless_search(&mut self, query: &str, set_code: &str) {
        self.endless_set = Some(set_code.to_string());
        self.first_pages.insert(
            format!("q:{}", query),
            SearchPage {
                data: vec![api_card("endless-0", "Endless 0", set_code, "1")],
                has_more: true,
                next_page: Some("endless#1".to_string()),
                total_cards: None,
            },
        );
    }

    pub fn fail_search(&mut self, query: &str) {
        self.failing_queries.insert(query.to_string());
    }

    pub fn fail_listing(&mut self, set_code: &str) {
        self.failing_listings.insert(set_code.to_string());
    }

    pub fn add_metadata(&mut self, meta: SetMetadata) {
        self.metadata.insert(meta.code.clone(), meta);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn resolve_token(&self, token: &str) -> Result<SearchPage> {
        if self.failing_tokens.contains(token) {
            return Err(BinderError::Malformed(format!("broken token {}", token)));
        }
        if let Some(n) = token.strip_prefix("endless#") {
            let n: usize = n.parse().unwrap();
            let set = self.endless_set.clone().unwrap_or_default();
            return Ok(SearchPage {
                data: vec![api_card(
                    &format!("endless-{}", n),
                    &format!("Endless {}", n),
                    &set,
                    &(n + 1).to_string(),
                )],
                has_more: true,
                next_page: Some(format!("endless#{}", n + 1)),
                total_cards: None,
            });
        }
        Ok(self.continuations.get(token).cloned().unwrap_or_default())
    }
}

impl CardSource for MockSource {
    fn search(&self, query: &str, page: Option<&str>) -> Result<SearchPage> {
        self.record(format!("search:{}:{}", query, page.unwrap_or("-")));
        match page {
            Some(token) => self.resolve_token(token),
            None => {
                if self.failing_queries.contains(query) {
                    return Err(BinderError::Malformed(format!("query {:?} failed", query)));
                }
                Ok(self
                    .first_pages
                    .get(&format!("q:{}", query))
                    .cloned()
                    .unwrap_or_default())
            }
        }
    }

    fn set_cards(&self, set_code: &str, page: Option<&str>) -> Result<SearchPage> {
        self.record(format!("listing:{}:{}", set_code, page.unwrap_or("-")));
        match page {
            Some(token) => self.resolve_token(token),
            None => {
                if self.failing_listings.contains(set_code) {
                    return Err(BinderError::NotFound(format!("set {}", set_code)));
                }
                Ok(self
                    .first_pages
                    .get(&format!("l:{}", set_code))
                    .cloned()
                    .unwrap_or_default())
            }
        }
    }

    fn set_metadata(&self, set_code: &str) -> Result<SetMetadata> {
        self.record(format!("metadata:{}", set_code));
        self.metadata
            .get(set_code)
            .cloned()
            .ok_or_else(|| BinderError::NotFound(format!("set {}", set_code)))
    }
}
