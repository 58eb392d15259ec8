//! Cardbinder: a set checklist and collection tracker for trading cards.
//!
//! Reconstructs a complete, ordered, duplicate-free card list per tracked
//! set from a Scryfall-style card-search API (paginated, inconsistent
//! about variant prints, missing some cards entirely), and persists
//! per-card collected/foil state locally.
//!
//! # Quick start
//!
//! ```no_run
//! use cardbinder::CardBinder;
//!
//! let binder = CardBinder::builder().build().unwrap();
//!
//! // Reconcile the full card list for a set (cached for the session)
//! let cards = binder.reconcile("spm").unwrap();
//!
//! // Track ownership
//! let entry = binder.set_collected("spm", &cards[0].identity, true);
//! assert!(entry.collected);
//! ```

pub mod api;
#[cfg(feature = "async")]
pub mod async_client;
pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;

pub use api::{CardSource, ScryfallApi};
#[cfg(feature = "async")]
pub use async_client::AsyncCardBinder;
pub use collection::{BlobStore, CollectionEntry, CollectionStore, FileStore, MemoryStore};
pub use error::{BinderError, Result};
pub use models::{Card, SetDefinition, SetMetadata};
pub use reconcile::{ReconcileStats, ReconciledSet, SetReconciler};

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// CardBinderBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CardBinder`] instance.
///
/// Use [`CardBinder::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CardBinderBuilder::build).
pub struct CardBinderBuilder {
    base_url: String,
    timeout: Duration,
    data_dir: Option<PathBuf>,
    sets: Option<Vec<SetDefinition>>,
    source: Option<Box<dyn CardSource>>,
    store: Option<Box<dyn BlobStore>>,
}

impl Default for CardBinderBuilder {
    fn default() -> Self {
        Self {
            base_url: config::API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            data_dir: None,
            sets: None,
            source: None,
            store: None,
        }
    }
}

impl CardBinderBuilder {
    /// Override the card API base URL.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom directory for persisted collection state.
    ///
    /// If not set, the platform-appropriate data directory is used
    /// (e.g. `~/.local/share/cardbinder` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the builtin tracked-set definitions.
    pub fn sets(mut self, sets: Vec<SetDefinition>) -> Self {
        self.sets = Some(sets);
        self
    }

    /// Inject a custom [`CardSource`] instead of the HTTP client.
    pub fn source(mut self, source: Box<dyn CardSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Inject a custom [`BlobStore`] instead of the file-backed store.
    pub fn store(mut self, store: Box<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the binder, constructing the HTTP client and loading (and, if
    /// legacy, migrating) persisted collection state. No set is reconciled
    /// eagerly; card lists are fetched lazily on first [`CardBinder::reconcile`].
    pub fn build(self) -> Result<CardBinder> {
        let source = match self.source {
            Some(source) => source,
            None => Box::new(ScryfallApi::new(&self.base_url, self.timeout)?),
        };
        let sets = self.sets.unwrap_or_else(config::builtin_sets);
        let store: Box<dyn BlobStore> = match self.store {
            Some(store) => store,
            None => Box::new(FileStore::new(
                self.data_dir.unwrap_or_else(config::default_data_dir),
            )?),
        };
        let default_set = sets.first().map(|s| s.code.clone()).unwrap_or_default();
        let collection = CollectionStore::load(store, &default_set);

        Ok(CardBinder {
            source,
            sets,
            cache: RefCell::new(HashMap::new()),
            stats: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(HashSet::new()),
            collection: RefCell::new(collection),
        })
    }
}

// ---------------------------------------------------------------------------
// CardBinder
// ---------------------------------------------------------------------------

/// Per-set collection progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub collected: usize,
    /// The set definition's expected total — the authoritative denominator,
    /// independent of how many cards were actually discovered.
    pub expected_total: u32,
}

/// The main entry point: tracked-set registry, session reconcile cache,
/// and collection state.
///
/// Created via [`CardBinder::builder()`].
pub struct CardBinder {
    source: Box<dyn CardSource>,
    sets: Vec<SetDefinition>,
    /// Reconciled lists, filled exactly once per set code per session.
    cache: RefCell<HashMap<String, Vec<Card>>>,
    stats: RefCell<HashMap<String, ReconcileStats>>,
    /// Set codes with a reconciliation in flight. Rejects re-entrant calls
    /// for the same code; different codes are independent.
    in_flight: RefCell<HashSet<String>>,
    collection: RefCell<CollectionStore>,
}

impl CardBinder {
    /// Create a new builder for configuring the binder.
    pub fn builder() -> CardBinderBuilder {
        CardBinderBuilder::default()
    }

    // -- Set registry ------------------------------------------------------

    /// The tracked set definitions.
    pub fn sets(&self) -> &[SetDefinition] {
        &self.sets
    }

    /// Look up a tracked set by code (case-insensitive).
    pub fn set_definition(&self, code: &str) -> Option<&SetDefinition> {
        self.sets.iter().find(|s| s.code.eq_ignore_ascii_case(code))
    }

    // -- Reconciliation ----------------------------------------------------

    /// Reconcile the full card list for a set.
    ///
    /// The first call per set code runs the whole pipeline; the result is
    /// cached and reused for the rest of the session without re-querying.
    /// A re-entrant call for a code already in flight is rejected with
    /// [`BinderError::InvalidArgument`]; an unknown code with
    /// [`BinderError::NotFound`].
    pub fn reconcile(&self, set_code: &str) -> Result<Vec<Card>> {
        let code = set_code.to_lowercase();
        if let Some(cards) = self.cache.borrow().get(&code) {
            return Ok(cards.clone());
        }
        let set = self
            .set_definition(&code)
            .ok_or_else(|| BinderError::NotFound(format!("unknown set {:?}", set_code)))?;

        if !self.in_flight.borrow_mut().insert(code.clone()) {
            return Err(BinderError::InvalidArgument(format!(
                "reconciliation already in flight for set {:?}",
                code
            )));
        }
        let result = SetReconciler::new(self.source.as_ref()).reconcile(set);
        self.in_flight.borrow_mut().remove(&code);

        let reconciled = result?;
        self.cache
            .borrow_mut()
            .insert(code.clone(), reconciled.cards.clone());
        self.stats.borrow_mut().insert(code, reconciled.stats);
        Ok(reconciled.cards)
    }

    /// Peek the session cache; never fetches.
    pub fn cached_set(&self, set_code: &str) -> Option<Vec<Card>> {
        self.cache.borrow().get(&set_code.to_lowercase()).cloned()
    }

    /// Statistics from a cached reconciliation, if one has run.
    pub fn stats(&self, set_code: &str) -> Option<ReconcileStats> {
        self.stats
            .borrow()
            .get(&set_code.to_lowercase())
            .cloned()
    }

    /// Fetch display metadata for a set from the API (uncached).
    pub fn set_info(&self, set_code: &str) -> Result<SetMetadata> {
        self.source.set_metadata(&set_code.to_lowercase())
    }

    // -- Collection state --------------------------------------------------

    /// Mark a card collected or not, persisting the change. Uncollecting
    /// resets the foil flag in the same operation.
    pub fn set_collected(&self, set_code: &str, card_id: &str, collected: bool) -> CollectionEntry {
        self.collection
            .borrow_mut()
            .set_collected(&set_code.to_lowercase(), card_id, collected)
    }

    /// Set a card's foil flag. A no-op while the card is uncollected.
    pub fn set_foil(&self, set_code: &str, card_id: &str, foil: bool) -> CollectionEntry {
        self.collection
            .borrow_mut()
            .set_foil(&set_code.to_lowercase(), card_id, foil)
    }

    /// Current ownership state for one card.
    pub fn entry(&self, set_code: &str, card_id: &str) -> CollectionEntry {
        self.collection
            .borrow()
            .entry(&set_code.to_lowercase(), card_id)
    }

    /// Collection progress for a tracked set. The denominator is the set
    /// definition's expected total.
    pub fn progress(&self, set_code: &str) -> Option<Progress> {
        let set = self.set_definition(set_code)?;
        Some(Progress {
            collected: self.collection.borrow().collected_count(&set.code),
            expected_total: set.expected_total,
        })
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CardBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.sets.iter().map(|s| s.code.as_str()).collect();
        let cached: Vec<String> = self.cache.borrow().keys().cloned().collect();
        write!(
            f,
            "CardBinder(sets=[{}], cached=[{}])",
            codes.join(", "),
            cached.join(", ")
        )
    }
}
