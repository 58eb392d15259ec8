//! The accumulator threaded through every reconciliation phase.

use std::collections::HashSet;

use crate::models::Card;

/// In-progress card list plus the identity set of everything already
/// accepted. One instance per reconciliation run; phases receive it by
/// mutable reference, so runs for different sets are fully independent.
#[derive(Debug, Default)]
pub struct Accumulator {
    cards: Vec<Card>,
    seen: HashSet<String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a card unless its identity was already seen.
    /// Returns whether the card was inserted.
    pub fn insert(&mut self, card: Card) -> bool {
        if self.seen.contains(&card.identity) {
            return false;
        }
        self.seen.insert(card.identity.clone());
        self.cards.push(card);
        true
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        self.seen.contains(identity)
    }

    /// By-number presence check. Used only where the spec dedupes by
    /// number: the missing-number input filter and placeholder injection.
    pub fn contains_number(&self, number: u32) -> bool {
        self.cards.iter().any(|c| c.collector_number == number)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Finalize: drop any later duplicate identities (first occurrence
    /// wins) and sort ascending by collector number, stable on ties so
    /// accumulation order is preserved.
    pub fn into_sorted(self) -> Vec<Card> {
        let mut out: Vec<Card> = Vec::with_capacity(self.cards.len());
        let mut emitted: HashSet<String> = HashSet::with_capacity(self.cards.len());
        for card in self.cards {
            if emitted.insert(card.identity.clone()) {
                out.push(card);
            }
        }
        out.sort_by_key(|c| c.collector_number);
        out
    }
}
