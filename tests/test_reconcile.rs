//! End-to-end reconciliation pipeline tests.

mod common;

use std::collections::HashSet;

use cardbinder::models::{ApiCard, PlaceholderSpec, SetDefinition, SetMetadata};
use cardbinder::reconcile::SetReconciler;
use cardbinder::{BinderError, CardBinder, MemoryStore};
use common::{api_card, MockSource};

fn spider_set() -> SetDefinition {
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
    }
}

/// 380 displayable base cards: numbers 1..=381 with 363 absent.
fn base_cards() -> Vec<ApiCard> {
    (1..=381u32)
        .filter(|n| *n != 363)
        .map(|n| api_card(&format!("base-{}", n), &format!("Card {}", n), "spm", &n.to_string()))
        .collect()
}

fn paged(cards: Vec<ApiCard>, page_size: usize) -> Vec<Vec<ApiCard>> {
    cards.chunks(page_size).map(|c| c.to_vec()).collect()
}

// ---------------------------------------------------------------------------
// The headline scenario: 380 + 8 + 1 + 2 = 391, denominator stays 394
// ---------------------------------------------------------------------------

#[test]
fn full_pipeline_scenario() {
    let set = spider_set();
    let mut source = MockSource::new();

    // Primary discovery: 380 cards over 4 pages.
    source.add_search("e:spm unique:prints", paged(base_cards(), 100));

    // Variant discovery: the listing repeats the base cards and adds 8
    // showcase prints with fresh identities.
    let mut listing = base_cards();
    for n in 1..=8u32 {
        listing.push(api_card(
            &format!("showcase-{}", n),
            &format!("Showcase {}", n),
            "spm",
            &(150 + n).to_string(),
        ));
    }
    source.add_listing("spm", paged(listing, 100));

    // Recovery finds one of the three missing numbers by number search.
    source.add_search(
        "set:spm number:363",
        vec![vec![api_card("x363", "Spider-Man 2099", "spm", "363")]],
    );

    let reconciled = SetReconciler::new(&source).reconcile(&set).unwrap();

    assert_eq!(reconciled.cards.len(), 391);
    assert_eq!(reconciled.stats.discovered, 380);
    assert_eq!(reconciled.stats.variants_added, 8);
    assert_eq!(reconciled.stats.recovered, 1);
    assert_eq!(reconciled.stats.placeholders, 2);
    assert_eq!(reconciled.stats.expected_total, 394);

    // Identities are unique post-dedupe.
    let ids: HashSet<&str> = reconciled.cards.iter().map(|c| c.identity.as_str()).collect();
    assert_eq!(ids.len(), reconciled.cards.len());

    // Sorted ascending by collector number.
    let numbers: Vec<u32> = reconciled.cards.iter().map(|c| c.collector_number).collect();
    let mut sorted = numbers.clone();
    sorted.sort();
    assert_eq!(numbers, sorted);

    // The recovered number is a real card; the other two are placeholders.
    let n363 = reconciled.cards.iter().find(|c| c.collector_number == 363).unwrap();
    assert!(!n363.placeholder);
    let n393 = reconciled.cards.iter().find(|c| c.collector_number == 393).unwrap();
    assert!(n393.placeholder);
    assert_eq!(n393.identity, "placeholder:spm:393");
}

// ---------------------------------------------------------------------------
// Ordering and placeholder policy
// ---------------------------------------------------------------------------

#[test]
fn ties_keep_accumulation_order() {
    let set = SetDefinition {
        code: "spm".into(),
        name: "Marvel's Spider-Man".into(),
        expected_total: 10,
        missing_numbers: vec![],
        placeholders: vec![],
    };
    let mut source = MockSource::new();
    // Two prints legitimately sharing a collector number.
    source.add_search(
        "e:spm unique:prints",
        vec![vec![
            api_card("first-5", "Print A", "spm", "5"),
            api_card("second-5", "Print B", "spm", "5"),
            api_card("n1", "Opener", "spm", "1"),
        ]],
    );

    let reconciled = SetReconciler::new(&source).reconcile(&set).unwrap();
    let ids: Vec<&str> = reconciled.cards.iter().map(|c| c.identity.as_str()).collect();
    assert_eq!(ids, vec!["n1", "first-5", "second-5"]);
}

#[test]
fn placeholder_is_not_injected_when_any_phase_found_the_number() {
    let set = spider_set();
    let mut source = MockSource::new();
    // Variant discovery (the listing) happens to surface number 394.
    source.add_listing(
        "spm",
        vec![vec![api_card("v394", "Venom, Lethal Protector", "spm", "394")]],
    );
    source.add_search(
        "e:spm unique:prints",
        vec![vec![api_card("base-1", "Card 1", "spm", "1")]],
    );

    let reconciled = SetReconciler::new(&source).reconcile(&set).unwrap();

    let n394 = reconciled.cards.iter().find(|c| c.collector_number == 394).unwrap();
    assert!(!n394.placeholder);
    assert!(!reconciled
        .cards
        .iter()
        .any(|c| c.identity == "placeholder:spm:394"));
}

// ---------------------------------------------------------------------------
// Failure semantics
// ---------------------------------------------------------------------------

#[test]
fn exhausted_fallbacks_only_when_everything_fails() {
    let set = spider_set();
    let mut source = MockSource::new();
    source.fail_search("e:spm unique:prints");
    source.fail_search("set:spm unique:prints");
    source.fail_listing("spm");
    source.fail_search("\"Marvel's Spider-Man\" unique:prints");

    let err = SetReconciler::new(&source).reconcile(&set).unwrap_err();
    assert!(matches!(err, BinderError::ExhaustedFallbacks(code) if code == "spm"));
}

#[test]
fn empty_successful_discovery_still_yields_placeholders() {
    let set = spider_set();
    // No scripted responses: every query succeeds with an empty page.
    let source = MockSource::new();

    let reconciled = SetReconciler::new(&source).reconcile(&set).unwrap();

    assert_eq!(reconciled.cards.len(), 3);
    assert!(reconciled.cards.iter().all(|c| c.placeholder));
    assert_eq!(reconciled.stats.placeholders, 3);
}

#[test]
fn primary_failure_recovers_through_the_fallback_listing() {
    let set = spider_set();
    let mut source = MockSource::new();
    source.fail_search("e:spm unique:prints");
    source.fail_search("set:spm unique:prints");
    source.add_listing("spm", vec![vec![api_card("a", "Card 1", "spm", "1")]]);

    let reconciled = SetReconciler::new(&source).reconcile(&set).unwrap();
    assert!(reconciled.cards.iter().any(|c| c.identity == "a"));
}

// ---------------------------------------------------------------------------
// CardBinder: session cache and registry
// ---------------------------------------------------------------------------

fn binder_with(source: MockSource) -> CardBinder {
    CardBinder::builder()
        .sets(vec![spider_set()])
        .source(Box::new(source))
        .store(Box::new(MemoryStore::new()))
        .build()
        .unwrap()
}

#[test]
fn second_reconcile_hits_the_cache_without_fetching() {
    let mut source = MockSource::new();
    source.add_search(
        "e:spm unique:prints",
        vec![vec![api_card("a", "Card 1", "spm", "1")]],
    );
    let handle = source.clone();
    let binder = binder_with(source);

    let first = binder.reconcile("spm").unwrap();
    let calls_after_first = handle.call_count();
    let second = binder.reconcile("spm").unwrap();

    assert_eq!(first, second);
    assert_eq!(handle.call_count(), calls_after_first);
    assert!(binder.cached_set("spm").is_some());
    assert_eq!(binder.stats("spm").unwrap().expected_total, 394);
}

#[test]
fn set_codes_are_case_insensitive() {
    let mut source = MockSource::new();
    source.add_search(
        "e:spm unique:prints",
        vec![vec![api_card("a", "Card 1", "spm", "1")]],
    );
    let binder = binder_with(source);

    binder.reconcile("SPM").unwrap();
    assert!(binder.cached_set("spm").is_some());
}

#[test]
fn unknown_set_code_is_not_found() {
    let binder = binder_with(MockSource::new());
    let err = binder.reconcile("zzz").unwrap_err();
    assert!(matches!(err, BinderError::NotFound(_)));
}

#[test]
fn cached_set_never_fetches() {
    let source = MockSource::new();
    let handle = source.clone();
    let binder = binder_with(source);

    assert!(binder.cached_set("spm").is_none());
    assert_eq!(handle.call_count(), 0);
}

#[test]
fn set_info_queries_the_metadata_endpoint() {
    let mut source = MockSource::new();
    source.add_metadata(SetMetadata {
        code: "spm".into(),
        name: "Marvel's Spider-Man".into(),
        card_count: Some(394),
        parent_set_code: None,
    });
    let binder = binder_with(source);

    let meta = binder.set_info("spm").unwrap();
    assert_eq!(meta.card_count, Some(394));
}
