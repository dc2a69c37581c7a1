//! End-to-end conversation scenarios.
//!
//! Each test drives `ChatEngine::handle_turn` over a small CSV catalog and
//! checks both the outcome and what the session state looks like afterwards.

use std::sync::Arc;

use unicorn_chat::{
    Catalog, ChatEngine, ChatError, ClarifyReason, ConversationState, InvalidInputError,
    TurnOutcome, UnresolvedReason,
};
use unicorn_core::config::{ChatConfig, DatasetConfig};
use unicorn_core::{Dataset, MetricsTracker, NoopSink, Tier, UnicornConfig};

// =============================================================================
// Helpers
// =============================================================================

const CATALOG_CSV: &str = "\
Company,primary_sector,location,valuation,company_background
Juspay,Payments,\"Bengaluru, Karnataka\",$1.2B,Payment orchestration platform
Money View,Alternative Lending,\"Bengaluru, Karnataka\",$900M,Credit and personal loans app
Rapido,Mobility,\"Bengaluru, Karnataka\",$1.1B,Bike taxi aggregator
Razorpay,Payments,\"Bengaluru, Karnataka\",$7.5B,Payment gateway for businesses
Zepto,Online Grocery,\"Mumbai, Maharashtra\",$5B,Quick commerce grocery delivery
Delhivery,Logistics Tech,\"Gurugram, Haryana\",$4.9B,Logistics and supply chain services
";

fn engine_with(chat: ChatConfig) -> ChatEngine {
    let dataset =
        Dataset::from_csv_str(CATALOG_CSV, &DatasetConfig::default()).expect("valid test CSV");
    let catalog = Catalog::from_config(dataset, &UnicornConfig::default());
    ChatEngine::new(Arc::new(catalog), &chat)
}

fn engine() -> ChatEngine {
    engine_with(ChatConfig::default())
}

fn answer_names(outcome: &TurnOutcome) -> Vec<String> {
    match outcome {
        TurnOutcome::Answer(a) => a.results.names().into_iter().map(String::from).collect(),
        TurnOutcome::Clarification(c) => panic!("expected an answer, got clarification: {}", c.prompt),
    }
}

fn turn(engine: &ChatEngine, state: &mut ConversationState, text: &str) -> TurnOutcome {
    engine
        .handle_turn(text, state, &NoopSink)
        .unwrap_or_else(|e| panic!("turn {:?} failed: {}", text, e))
}

// =============================================================================
// Drill-down
// =============================================================================

#[test]
fn test_fintech_then_bangalore_keeps_both() {
    let engine = engine();
    let mut state = ConversationState::new();

    let first = turn(&engine, &mut state, "Tell me about fintech unicorns");
    assert_eq!(answer_names(&first), vec!["Juspay", "Money View", "Razorpay"]);
    assert!(first.text().starts_with("Here is the information I found:"));

    let second = turn(&engine, &mut state, "Which of these are based in Bangalore?");
    assert_eq!(answer_names(&second), vec!["Juspay", "Money View", "Razorpay"]);
    assert!(second
        .text()
        .starts_with("Based on your previous query, the companies matching your criteria are:"));

    // Rapido is in Bengaluru but was never part of the fintech context.
    assert!(!state.current_context().names().contains(&"Rapido"));
    assert_eq!(state.history().len(), 2);
}

#[test]
fn test_three_step_drill_down() {
    let engine = engine();
    let mut state = ConversationState::new();

    turn(&engine, &mut state, "fintech");
    turn(&engine, &mut state, "which of them are in bangalore");
    let third = turn(&engine, &mut state, "which of these have a high valuation?");

    assert_eq!(answer_names(&third), vec!["Razorpay"]);
    match &third {
        TurnOutcome::Answer(a) => assert_eq!(a.tier, Tier::Contextual),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_valuation_comparison_on_context() {
    let engine = engine();
    let mut state = ConversationState::new();
    turn(&engine, &mut state, "fintech");
    let out = turn(&engine, &mut state, "which of them are valued above 1 billion");
    assert_eq!(answer_names(&out), vec!["Juspay", "Razorpay"]);
}

#[test]
fn test_more_than_excludes_exact_bound() {
    let engine = engine();
    let mut state = ConversationState::new();
    turn(&engine, &mut state, "ecommerce");

    let strict = turn(&engine, &mut state, "which of them are valued more than 5 billion");
    assert!(answer_names(&strict).is_empty());

    state.reset();
    turn(&engine, &mut state, "ecommerce");
    let inclusive = turn(&engine, &mut state, "which of them are valued at least 5 billion");
    assert_eq!(answer_names(&inclusive), vec!["Zepto"]);
}

#[test]
fn test_comparison_with_thousands_separator() {
    let engine = engine();
    let mut state = ConversationState::new();
    turn(&engine, &mut state, "fintech");
    let out = turn(&engine, &mut state, "which of them are valued above 1,100 million");
    assert_eq!(answer_names(&out), vec!["Juspay", "Razorpay"]);
}

#[test]
fn test_sector_after_context_narrows_context() {
    let engine = engine();
    let mut state = ConversationState::new();
    turn(&engine, &mut state, "companies in bangalore");
    // No context yet, so the location-only query clarifies.
    assert!(!state.has_context());

    turn(&engine, &mut state, "fintech");
    let out = turn(&engine, &mut state, "ecommerce");
    // Zepto exists in the dataset but not in the fintech context.
    assert!(answer_names(&out).is_empty());
    assert_eq!(
        out.text(),
        "None of the previously listed companies match that criterion."
    );
    assert!(!state.has_context());
}

// =============================================================================
// Tier 1
// =============================================================================

#[test]
fn test_entity_ignores_context() {
    let engine = engine();
    let mut state = ConversationState::new();
    turn(&engine, &mut state, "fintech");

    let out = turn(&engine, &mut state, "What does Zepto do?");
    assert_eq!(answer_names(&out), vec!["Zepto"]);
    assert!(out.text().contains("Quick commerce grocery delivery"));
    assert_eq!(state.current_context().names(), vec!["Zepto"]);
}

#[test]
fn test_multiple_entities() {
    let engine = engine();
    let mut state = ConversationState::new();
    let out = turn(&engine, &mut state, "compare Razorpay and Juspay");
    assert_eq!(answer_names(&out), vec!["Razorpay", "Juspay"]);
}

#[test]
fn test_entity_alias_without_spaces() {
    let engine = engine();
    let out = turn(&engine, &mut ConversationState::new(), "is moneyview profitable");
    assert_eq!(answer_names(&out), vec!["Money View"]);
}

// =============================================================================
// Clarifications
// =============================================================================

#[test]
fn test_high_valuation_without_context_clarifies() {
    let engine = engine();
    let mut state = ConversationState::new();
    let out = turn(&engine, &mut state, "High Valuation");

    match &out {
        TurnOutcome::Clarification(c) => {
            assert_eq!(
                c.reason,
                ClarifyReason::Unresolvable(UnresolvedReason::EmptyContext)
            );
        }
        other => panic!("expected clarification, got {:?}", other),
    }
    assert!(!state.has_context());
    assert!(state.history().is_empty());
}

#[test]
fn test_clarification_preserves_drill_down() {
    let engine = engine();
    let mut state = ConversationState::new();
    turn(&engine, &mut state, "fintech");
    let before = state.last_entry().cloned();
    let context_before = state.current_context().keys();

    let out = turn(&engine, &mut state, "suggest the best");
    assert!(out.is_clarification());
    assert_eq!(
        out.text(),
        "Could you verify which specific sector or criteria you are looking for? (e.g., Valuation, Sector, Location)"
    );

    assert_eq!(state.last_entry().cloned(), before);
    assert_eq!(state.current_context().keys(), context_before);

    // The drill-down continues from where it was.
    let next = turn(&engine, &mut state, "which of these are in bangalore");
    assert_eq!(answer_names(&next), vec!["Juspay", "Money View", "Razorpay"]);
}

#[test]
fn test_unknown_location_clarifies_instead_of_empty_answer() {
    let engine = engine();
    let mut state = ConversationState::new();
    turn(&engine, &mut state, "fintech");

    let out = turn(&engine, &mut state, "which of these are in chennai");
    match &out {
        TurnOutcome::Clarification(c) => assert_eq!(c.reason, ClarifyReason::AmbiguousEmpty),
        other => panic!("expected clarification, got {:?}", other),
    }
    assert_eq!(state.current_context().len(), 3);
}

#[test]
fn test_too_broad_result_clarifies() {
    let engine = engine_with(ChatConfig {
        clarification_threshold: 2,
        ..ChatConfig::default()
    });
    let mut state = ConversationState::new();
    let out = turn(&engine, &mut state, "fintech companies");
    match &out {
        TurnOutcome::Clarification(c) => {
            assert_eq!(c.reason, ClarifyReason::TooBroad { rows: 3 });
        }
        other => panic!("expected clarification, got {:?}", other),
    }
    assert!(state.history().is_empty());
}

#[test]
fn test_sector_intent_without_values_clarifies() {
    let dataset =
        Dataset::from_csv_str(CATALOG_CSV, &DatasetConfig::default()).expect("valid test CSV");
    let mut config = UnicornConfig::default();
    config.sectors.insert("gaming".to_string(), Vec::new());
    let catalog = Catalog::from_config(dataset, &config);
    let engine = ChatEngine::new(Arc::new(catalog), &config.chat);

    let mut state = ConversationState::new();
    let out = turn(&engine, &mut state, "gaming companies");
    assert!(out.is_clarification());
    assert!(!state.has_context());
    assert!(state.history().is_empty());
}

#[test]
fn test_gibberish_clarifies() {
    let engine = engine();
    let out = turn(&engine, &mut ConversationState::new(), "hello there");
    assert!(out.is_clarification());
}

// =============================================================================
// Invalid input
// =============================================================================

#[test]
fn test_empty_input_is_rejected() {
    let engine = engine();
    let mut state = ConversationState::new();
    let err = engine.handle_turn("   ", &mut state, &NoopSink).unwrap_err();
    assert!(matches!(err, ChatError::InvalidInput(InvalidInputError::Empty)));
    assert!(state.history().is_empty());
}

#[test]
fn test_over_length_input_is_rejected() {
    let engine = engine();
    let mut state = ConversationState::new();
    turn(&engine, &mut state, "fintech");

    let long = "fintech ".repeat(100);
    let err = engine.handle_turn(&long, &mut state, &NoopSink).unwrap_err();
    assert!(matches!(
        err,
        ChatError::InvalidInput(InvalidInputError::TooLong { max: 500 })
    ));
    assert_eq!(state.history().len(), 1);
    assert!(!err.user_message().is_empty());
}

// =============================================================================
// Metrics
// =============================================================================

#[test]
fn test_tracker_aggregates_turns() {
    let engine = engine();
    let tracker = MetricsTracker::new();
    let mut state = ConversationState::new();

    engine.handle_turn("fintech", &mut state, &tracker).unwrap();
    engine.handle_turn("best", &mut state, &tracker).unwrap();
    let _ = engine.handle_turn("", &mut state, &tracker);

    let summary = tracker.summary();
    assert_eq!(summary.total_queries, 3);
    assert_eq!(summary.clarifications_triggered, 1);
    assert_eq!(summary.errors, 1);
}

#[test]
fn test_sessions_are_independent() {
    let engine = engine();
    let mut alice = ConversationState::new();
    let mut bob = ConversationState::new();

    turn(&engine, &mut alice, "fintech");
    let out = turn(&engine, &mut bob, "which of these are in bangalore");
    assert!(out.is_clarification());
    assert_eq!(alice.current_context().len(), 3);
}
