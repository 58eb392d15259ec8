//! The set-reconciliation engine.
//!
//! Reconstructs a complete, ordered, duplicate-free card list for one set
//! from a paginated API that is inconsistent about variant prints and
//! missing some cards entirely: primary discovery, variant discovery,
//! by-number recovery, then placeholder injection, all merging into one
//! accumulator deduplicated by identity.

pub mod accumulator;
pub mod cascade;
pub mod placeholder;
pub mod recovery;

pub use accumulator::Accumulator;
pub use cascade::{run_cascade, walk_pages, CascadeOutcome, QueryFailure};
pub use placeholder::inject_placeholders;
pub use recovery::{recover_missing, RecoveryOutcome};

use crate::api::CardSource;
use crate::config;
use crate::error::{BinderError, Result};
use crate::models::{Card, SetDefinition};

// ---------------------------------------------------------------------------
// ReconcileStats / ReconciledSet
// ---------------------------------------------------------------------------

/// Per-phase counts surfaced to the UI alongside the card list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileStats {
    /// Cards found by primary discovery (including the fallback cascade).
    pub discovered: usize,
    /// Cards added by variant discovery.
    pub variants_added: usize,
    /// Missing numbers located by recovery.
    pub recovered: usize,
    /// Placeholders injected.
    pub placeholders: usize,
    /// Authoritative progress denominator, from the set definition.
    pub expected_total: u32,
}

/// The final ordered, deduplicated list for one set.
#[derive(Debug, Clone)]
pub struct ReconciledSet {
    pub cards: Vec<Card>,
    pub stats: ReconcileStats,
}

// ---------------------------------------------------------------------------
// SetReconciler
// ---------------------------------------------------------------------------

/// Sequences the discovery, recovery, and placeholder phases into one
/// deterministic pipeline per set. Individual query failures are non-fatal
/// throughout; the only error surfaced is [`BinderError::ExhaustedFallbacks`]
/// when primary discovery and its fallback cascade both come up empty while
/// reporting failures.
pub struct SetReconciler<'a> {
    source: &'a dyn CardSource,
}

impl<'a> SetReconciler<'a> {
    pub fn new(source: &'a dyn CardSource) -> Self {
        Self { source }
    }

    /// Run the full pipeline for one set.
    ///
    /// Phase order matters: placeholders run last so a number found by any
    /// earlier phase never gets a placeholder. The result is sorted
    /// ascending by collector number, stable on ties.
    pub fn reconcile(&self, set: &SetDefinition) -> Result<ReconciledSet> {
        let mut acc = Accumulator::new();

        // Primary discovery.
        let primary_specs = config::primary_queries(&set.code);
        let primary = run_cascade(self.source, &set.code, &primary_specs, &mut acc);

        // Total primary failure: try the broader fallback cascade before
        // surfacing an unable-to-load state. An empty result from queries
        // that *succeeded* is not a failure; placeholders may still fill in.
        if acc.is_empty() && primary.all_failed(primary_specs.len()) {
            let fallback_specs = config::fallback_queries(set);
            let fallback = run_cascade(self.source, &set.code, &fallback_specs, &mut acc);
            if acc.is_empty() && fallback.all_failed(fallback_specs.len()) {
                return Err(BinderError::ExhaustedFallbacks(set.code.clone()));
            }
        }
        let discovered = acc.len();

        // Variant discovery: the set listing first, then the narrower
        // alternate-treatment queries. Failures here never abort.
        let variant_specs = config::variant_queries(&set.code);
        let variants = run_cascade(self.source, &set.code, &variant_specs, &mut acc);

        // Missing-number recovery, then placeholders for whatever is left.
        let recovery = recover_missing(self.source, set, &mut acc);
        let placeholders = inject_placeholders(set, &mut acc);

        let stats = ReconcileStats {
            discovered,
            variants_added: variants.added,
            recovered: recovery.recovered.len(),
            placeholders,
            expected_total: set.expected_total,
        };
        log::debug!(
            "set {}: reconciled {} cards ({:?})",
            set.code,
            acc.len(),
            stats
        );

        Ok(ReconciledSet {
            cards: acc.into_sorted(),
            stats,
        })
    }
}
