//! Two-pass recovery of collector numbers absent from discovery.

use crate::api::CardSource;
use crate::config;
use crate::models::SetDefinition;
use crate::reconcile::accumulator::Accumulator;
use crate::reconcile::cascade::{run_cascade, QueryFailure};

/// Outcome of a recovery run over a set's missing-number list.
#[derive(Debug, Default)]
pub struct RecoveryOutcome {
    /// Numbers a query located.
    pub recovered: Vec<u32>,
    /// Numbers left for the placeholder injector.
    pub unresolved: Vec<u32>,
    pub failures: Vec<QueryFailure>,
}

/// Try the templates for one number in order, stopping at the first that
/// lands a record with that number in the accumulator.
fn try_templates(
    source: &dyn CardSource,
    set: &SetDefinition,
    number: u32,
    specs: &[config::QuerySpec],
    acc: &mut Accumulator,
    failures: &mut Vec<QueryFailure>,
) -> bool {
    for spec in specs {
        let outcome = run_cascade(source, &set.code, std::slice::from_ref(spec), acc);
        failures.extend(outcome.failures);
        if acc.contains_number(number) {
            return true;
        }
    }
    false
}

/// Recover the set's configured missing numbers.
///
/// Numbers already present in the accumulator are skipped, not re-searched.
/// Pass one searches by number with progressively relaxed set constraints;
/// pass two relaxes further to association by curated card name. A number
/// unresolved after both passes is reported, never fabricated here.
pub fn recover_missing(
    source: &dyn CardSource,
    set: &SetDefinition,
    acc: &mut Accumulator,
) -> RecoveryOutcome {
    let mut outcome = RecoveryOutcome::default();

    let pending: Vec<u32> = set
        .missing_numbers
        .iter()
        .copied()
        .filter(|n| !acc.contains_number(*n))
        .collect();

    let mut second_pass: Vec<u32> = Vec::new();
    for number in pending {
        let specs = config::number_queries(set, number);
        if try_templates(source, set, number, &specs, acc, &mut outcome.failures) {
            log::debug!("set {}: recovered #{} by number search", set.code, number);
            outcome.recovered.push(number);
        } else {
            second_pass.push(number);
        }
    }

    for number in second_pass {
        let name = set.placeholder_name(number);
        let specs = config::number_name_queries(set, number, name);
        if try_templates(source, set, number, &specs, acc, &mut outcome.failures) {
            log::debug!(
                "set {}: recovered #{} by number-and-name search",
                set.code,
                number
            );
            outcome.recovered.push(number);
        } else {
            log::debug!("set {}: #{} unresolved, leaving to placeholder", set.code, number);
            outcome.unresolved.push(number);
        }
    }

    outcome
}
