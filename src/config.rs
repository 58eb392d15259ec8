//! Static configuration: API location, page cap, curated set definitions,
//! and the data-driven query cascades consumed by the reconciliation engine.

use std::path::PathBuf;

use crate::models::{PlaceholderSpec, SetDefinition};

pub const API_BASE: &str = "https://api.scryfall.com";

/// Hard cap on pages followed per query, guarding against an API that
/// always claims "more".
pub const MAX_PAGES: usize = 200;

// ---------------------------------------------------------------------------
// Query descriptors
// ---------------------------------------------------------------------------

/// One step of a query cascade. Cascades are plain ordered lists of these;
/// the executor in `reconcile::cascade` is the only consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySpec {
    /// The dedicated all-cards-in-set listing endpoint.
    SetListing,
    /// A free-text search query.
    Search(String),
}

/// Primary discovery: all cards nominally in the set, with a fallback
/// query form in case the API rejects the first as not-found.
pub fn primary_queries(code: &str) -> Vec<QuerySpec> {
    vec![
        QuerySpec::Search(format!("e:{} unique:prints", code)),
        QuerySpec::Search(format!("set:{} unique:prints", code)),
    ]
}

/// Broader fallback cascade, run only when every primary query failed.
pub fn fallback_queries(set: &SetDefinition) -> Vec<QuerySpec> {
    vec![
        QuerySpec::SetListing,
        QuerySpec::Search(format!("\"{}\" unique:prints", set.name)),
    ]
}

/// Variant discovery: the set listing first (it is the most complete
/// source), then the narrower alternate-treatment queries.
pub fn variant_queries(code: &str) -> Vec<QuerySpec> {
    let mut specs = vec![QuerySpec::SetListing];
    for treatment in [
        "is:showcase",
        "is:borderless",
        "is:extendedart",
        "is:promo",
        "frame:future",
    ] {
        specs.push(QuerySpec::Search(format!(
            "set:{} {} unique:prints",
            code, treatment
        )));
    }
    specs
}

/// First recovery pass: locate one collector number with progressively
/// relaxed set constraints (code, then quoted display name).
pub fn number_queries(set: &SetDefinition, number: u32) -> Vec<QuerySpec> {
    vec![
        QuerySpec::Search(format!("set:{} number:{}", set.code, number)),
        QuerySpec::Search(format!("e:{} number:{}", set.code, number)),
        QuerySpec::Search(format!("set:\"{}\" number:{}", set.name, number)),
    ]
}

/// Second recovery pass: associate by curated card name rather than strict
/// set match. `name` comes from the placeholder list when one is curated
/// for this number.
pub fn number_name_queries(set: &SetDefinition, number: u32, name: Option<&str>) -> Vec<QuerySpec> {
    let mut specs = Vec::new();
    if let Some(name) = name {
        specs.push(QuerySpec::Search(format!("!\"{}\" number:{}", name, number)));
        specs.push(QuerySpec::Search(format!("\"{}\" number:{}", name, number)));
    }
    if let Some(word) = set.name.split_whitespace().next() {
        specs.push(QuerySpec::Search(format!("number:{} \"{}\"", number, word)));
    }
    specs
}

// ---------------------------------------------------------------------------
// Builtin sets
// ---------------------------------------------------------------------------

/// The operator-curated sets this checklist tracks.
pub fn builtin_sets() -> Vec<SetDefinition> {
    vec![
        SetDefinition {
            code: "spm".into(),
            name: "Marvel's Spider-Man".into(),
            expected_total: 394,
            missing_numbers: vec![363, 393, 394],
            placeholders: vec![
                PlaceholderSpec {
                    number: 363,
                    name: "Spider-Man 2099".into(),
                },
                PlaceholderSpec {
                    number: 393,
                    name: "Green Goblin, Nemesis".into(),
                },
                PlaceholderSpec {
                    number: 394,
                    name: "Venom, Lethal Protector".into(),
                },
            ],
        },
        SetDefinition {
            code: "spe".into(),
            name: "Marvel's Spider-Man Eternal".into(),
            expected_total: 84,
            missing_numbers: vec![83, 84],
            placeholders: vec![
                PlaceholderSpec {
                    number: 83,
                    name: "Silk, Web-Weaver".into(),
                },
                PlaceholderSpec {
                    number: 84,
                    name: "Doctor Octopus, Mastermind".into(),
                },
            ],
        },
    ]
}

/// Platform-default directory for persisted collection state.
pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("cardbinder")
    } else {
        PathBuf::from(".cardbinder")
    }
}
