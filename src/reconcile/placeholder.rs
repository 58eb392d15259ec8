//! Zero-image stand-ins for collector numbers no query could resolve.

use crate::models::{Card, SetDefinition};
use crate::reconcile::accumulator::Accumulator;

/// Inject a placeholder for each curated descriptor whose collector number
/// is still absent. The presence check is by number — a real card and its
/// placeholder are mutually exclusive — which also makes a second run a
/// no-op. Returns the number of placeholders inserted.
pub fn inject_placeholders(set: &SetDefinition, acc: &mut Accumulator) -> usize {
    let mut injected = 0;
    for spec in &set.placeholders {
        if acc.contains_number(spec.number) {
            continue;
        }
        if acc.insert(Card::placeholder(&set.code, spec.number, &spec.name)) {
            injected += 1;
        }
    }
    injected
}
