//! Generic query-cascade executor and cursor-pagination walker.
//!
//! Every fetch path in the pipeline — primary discovery, variant discovery,
//! and both missing-number recovery passes — is this one loop over a
//! different ordered list of [`QuerySpec`]s. The identity filter makes the
//! cascade idempotent: re-running any query against the same accumulator
//! inserts nothing.

use crate::api::CardSource;
use crate::config::{QuerySpec, MAX_PAGES};
use crate::error::Result;
use crate::models::SearchPage;
use crate::reconcile::accumulator::Accumulator;

// ---------------------------------------------------------------------------
// Structured phase results
// ---------------------------------------------------------------------------

/// One failed query within a cascade. Non-fatal by policy; collected so the
/// orchestrator can decide when accumulated failure must escalate.
#[derive(Debug, Clone)]
pub struct QueryFailure {
    pub query: String,
    pub error: String,
}

/// Outcome of one cascade run.
#[derive(Debug, Default)]
pub struct CascadeOutcome {
    /// Cards newly inserted into the accumulator.
    pub added: usize,
    pub failures: Vec<QueryFailure>,
}

impl CascadeOutcome {
    /// True when every query in the cascade failed outright.
    pub fn all_failed(&self, cascade_len: usize) -> bool {
        cascade_len > 0 && self.failures.len() == cascade_len
    }
}

// ---------------------------------------------------------------------------
// Page filter
// ---------------------------------------------------------------------------

/// Three-part filter applied to every fetched page: the record must be
/// unseen by identity, attributed to the requested set (case-insensitive --
/// fuzzy text queries can match cards from other sets), and displayable.
fn absorb_page(page: &SearchPage, set_code: &str, acc: &mut Accumulator) -> usize {
    let mut added = 0;
    for record in &page.data {
        if acc.contains_identity(record.identity()) {
            continue;
        }
        if !record.set.eq_ignore_ascii_case(set_code) {
            continue;
        }
        if !record.is_displayable() {
            continue;
        }
        if acc.insert(record.to_card()) {
            added += 1;
        }
    }
    added
}

// ---------------------------------------------------------------------------
// Page walker
// ---------------------------------------------------------------------------

/// Follow continuation tokens from `first` until the API stops signaling
/// more pages, a fetch fails (end-of-stream, not fatal), or the hard page
/// cap is reached. Returns the number of cards inserted.
pub fn walk_pages<F>(
    mut fetch: F,
    first: SearchPage,
    set_code: &str,
    acc: &mut Accumulator,
) -> usize
where
    F: FnMut(&str) -> Result<SearchPage>,
{
    let mut added = absorb_page(&first, set_code, acc);
    let mut token = first.continuation().map(str::to_string);
    let mut pages = 1usize;

    while let Some(next) = token {
        if pages >= MAX_PAGES {
            log::warn!(
                "set {}: stopping pagination at the {}-page cap",
                set_code,
                MAX_PAGES
            );
            break;
        }
        match fetch(&next) {
            Ok(page) => {
                added += absorb_page(&page, set_code, acc);
                token = page.continuation().map(str::to_string);
                pages += 1;
            }
            Err(e) => {
                log::warn!("set {}: page fetch failed, stopping walk: {}", set_code, e);
                break;
            }
        }
    }
    added
}

// ---------------------------------------------------------------------------
// Cascade executor
// ---------------------------------------------------------------------------

fn describe(spec: &QuerySpec) -> String {
    match spec {
        QuerySpec::SetListing => "<set listing>".to_string(),
        QuerySpec::Search(q) => q.clone(),
    }
}

/// Execute an ordered list of queries against `source`, merging survivors
/// into `acc`. A failed query is logged, recorded, and skipped — the
/// cascade never aborts. Each successful query is paginated to exhaustion
/// before the next one runs.
pub fn run_cascade(
    source: &dyn CardSource,
    set_code: &str,
    specs: &[QuerySpec],
    acc: &mut Accumulator,
) -> CascadeOutcome {
    let mut outcome = CascadeOutcome::default();

    for spec in specs {
        let first = match spec {
            QuerySpec::SetListing => source.set_cards(set_code, None),
            QuerySpec::Search(q) => source.search(q, None),
        };
        match first {
            Ok(page) => {
                let added = match spec {
                    QuerySpec::SetListing => walk_pages(
                        |token| source.set_cards(set_code, Some(token)),
                        page,
                        set_code,
                        acc,
                    ),
                    QuerySpec::Search(q) => {
                        walk_pages(|token| source.search(q, Some(token)), page, set_code, acc)
                    }
                };
                log::debug!(
                    "set {}: query {:?} added {} cards ({} total)",
                    set_code,
                    describe(spec),
                    added,
                    acc.len()
                );
                outcome.added += added;
            }
            Err(e) => {
                log::warn!(
                    "set {}: query {:?} failed, trying next: {}",
                    set_code,
                    describe(spec),
                    e
                );
                outcome.failures.push(QueryFailure {
                    query: describe(spec),
                    error: e.to_string(),
                });
            }
        }
    }
    outcome
}
