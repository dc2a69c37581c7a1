//! Rule-based query classifier.
//!
//! Turns sanitized text plus the current conversation state into an ordered
//! list of candidate [`Resolution`]s. Precedence is fixed: a named company
//! wins outright, then sector intents, then contextual filters.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use unicorn_core::Column;

use crate::catalog::Catalog;
use crate::context::ConversationState;
use crate::sanitizer::{contains_phrase, words};
use crate::types::{Predicate, Resolution, Scope, UnresolvedReason};

// =============================================================================
// Vocabulary
// =============================================================================

/// Spoken location -> substrings accepted in the location column.
static LOCATIONS: &[(&[&str], &[&str])] = &[
    (&["bangalore", "bengaluru", "blr"], &["Bengaluru", "Bangalore"]),
    (&["mumbai", "bombay"], &["Mumbai"]),
    (
        &["delhi", "ncr", "gurgaon", "gurugram", "noida"],
        &["Delhi", "Noida", "Gurugram", "Gurgaon"],
    ),
    (&["pune"], &["Pune"]),
    (&["hyderabad"], &["Hyderabad"]),
    (&["chennai", "madras"], &["Chennai"]),
];

/// Subjective words that need an anchor to mean anything.
static VAGUE_WORDS: &[&str] = &["best", "top", "good", "great", "suggest", "recommend", "promising"];

/// Words that refer back to the previous answer.
static FOLLOW_UP_WORDS: &[&str] = &["these", "those", "them", "they", "ones"];

struct ValuationPatterns {
    high: Regex,
    low: Regex,
    comparison: Regex,
    context: Regex,
}

static VALUATION_PATTERNS: LazyLock<ValuationPatterns> = LazyLock::new(|| ValuationPatterns {
    high: Regex::new(r"(?i)\b(?:high(?:ly|est|er)?|top|most)[\s-]+valu\w*|\bmost\s+valuable\b")
        .expect("Invalid high valuation regex"),
    low: Regex::new(r"(?i)\b(?:low(?:est|er)?|least)[\s-]+valu\w*|\bleast\s+valuable\b")
        .expect("Invalid low valuation regex"),
    comparison: Regex::new(
        r"(?i)\b(above|over|more\s+than|greater\s+than|at\s+least|exceeding|beyond|below|under|less\s+than)\s+(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)\s*(billion|bn|b|million|mn|m)?\b",
    )
    .expect("Invalid valuation comparison regex"),
    context: Regex::new(r"(?i)\bvalu\w*|\bworth\b").expect("Invalid valuation context regex"),
});

static WHICH_OF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwhich\s+(?:of|one)\b").expect("Invalid follow-up regex"));

// =============================================================================
// QueryClassifier
// =============================================================================

/// Attribute filters recognized in a query, independent of tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFilters {
    pub predicates: Vec<Predicate>,
}

impl ExtractedFilters {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn dimensions(&self) -> Vec<Column> {
        let mut dims = Vec::new();
        for p in &self.predicates {
            if !dims.contains(&p.column) {
                dims.push(p.column);
            }
        }
        dims
    }
}

/// Deterministic, inspectable query classifier.
#[derive(Debug, Clone)]
pub struct QueryClassifier {
    /// Valuation (billions USD) that separates "high" from "low".
    pub high_valuation_billions: f64,
}

impl QueryClassifier {
    pub fn new(high_valuation_billions: f64) -> Self {
        Self {
            high_valuation_billions,
        }
    }

    /// Classify sanitized text into ordered candidate resolutions.
    ///
    /// Always returns at least one candidate. Several candidates are only
    /// produced when several companies are named (one per company, in
    /// mention order).
    pub fn classify(
        &self,
        text: &str,
        catalog: &Catalog,
        state: &ConversationState,
    ) -> Vec<Resolution> {
        let tokens = words(text);

        // Tier 1: explicit company mentions win outright.
        let mentions = catalog.entities().find_mentions(text);
        if !mentions.is_empty() {
            debug!(mentions = mentions.len(), "Classified as entity lookup");
            return mentions
                .into_iter()
                .map(|m| Resolution::Entity {
                    key: m.key,
                    alias: m.alias,
                })
                .collect();
        }

        let intents = catalog.sectors().recognize(&tokens);
        let filters = self.extract_filters(text, &tokens);
        let has_context = state.has_context();

        // Tier 2: sector intent, drilling into the context when there is one.
        // An intent that maps to no sub-sector values filters nothing.
        let mut predicates = catalog.sectors().resolve_all(&intents);
        if !predicates.is_empty() {
            predicates.extend(filters.predicates);
            let scope = if has_context {
                Scope::Context
            } else {
                Scope::Dataset
            };
            debug!(?intents, ?scope, predicates = predicates.len(), "Classified as sector query");
            return vec![Resolution::Sector {
                intents,
                predicates,
                scope,
            }];
        }

        // Tier 3: filters only, never against the full dataset.
        if !filters.is_empty() {
            if !has_context {
                debug!("Filters without context, unresolvable");
                return vec![Resolution::Unresolvable {
                    reason: UnresolvedReason::EmptyContext,
                    dimensions: filters.dimensions(),
                }];
            }
            debug!(predicates = filters.predicates.len(), "Classified as contextual filter");
            return vec![Resolution::Contextual {
                predicates: filters.predicates,
            }];
        }

        if VAGUE_WORDS.iter().any(|w| tokens.iter().any(|t| t == w)) {
            return vec![Resolution::Unresolvable {
                reason: UnresolvedReason::Vague,
                dimensions: Vec::new(),
            }];
        }

        // A bare reference to the previous answer: identity filter on context.
        if is_follow_up(text, &tokens) {
            if has_context {
                return vec![Resolution::Contextual {
                    predicates: Vec::new(),
                }];
            }
            return vec![Resolution::Unresolvable {
                reason: UnresolvedReason::EmptyContext,
                dimensions: Vec::new(),
            }];
        }

        vec![Resolution::Unresolvable {
            reason: UnresolvedReason::NoRecognizedTerms,
            dimensions: Vec::new(),
        }]
    }

    /// Location and valuation filters found in the text.
    pub fn extract_filters(&self, text: &str, tokens: &[String]) -> ExtractedFilters {
        let mut predicates = Vec::new();

        let mut needles: Vec<String> = Vec::new();
        for (spoken, accepted) in LOCATIONS {
            if spoken.iter().any(|s| contains_phrase(tokens, s)) {
                for a in accepted.iter() {
                    if !needles.iter().any(|n| n == a) {
                        needles.push(a.to_string());
                    }
                }
            }
        }
        if !needles.is_empty() {
            predicates.push(Predicate::contains_any(Column::Location, needles));
        }

        predicates.extend(self.extract_valuation(text));

        ExtractedFilters { predicates }
    }

    fn extract_valuation(&self, text: &str) -> Vec<Predicate> {
        let pats = &*VALUATION_PATTERNS;
        let mut out = Vec::new();

        // Explicit comparisons need a unit or valuation wording nearby.
        let valuation_context = pats.context.is_match(text);
        for caps in pats.comparison.captures_iter(text) {
            let unit = caps.get(3).map(|m| m.as_str().to_lowercase());
            if unit.is_none() && !valuation_context {
                continue;
            }
            let Some(amount) = caps
                .get(2)
                .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
            else {
                continue;
            };
            let billions = match unit.as_deref() {
                Some("million" | "mn" | "m") => amount / 1000.0,
                _ => amount,
            };
            let op = caps
                .get(1)
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            let op = op.split_whitespace().collect::<Vec<_>>().join(" ");
            let predicate = match op.as_str() {
                "below" | "under" | "less than" => Predicate::valuation_below(billions),
                "at least" => Predicate::valuation_at_least(billions),
                _ => Predicate::valuation_above(billions),
            };
            out.push(predicate);
        }

        if out.is_empty() {
            if pats.high.is_match(text) {
                out.push(Predicate::valuation_at_least(self.high_valuation_billions));
            } else if pats.low.is_match(text) {
                out.push(Predicate::valuation_below(self.high_valuation_billions));
            }
        }

        out
    }
}

fn is_follow_up(text: &str, tokens: &[String]) -> bool {
    WHICH_OF_RE.is_match(text) || FOLLOW_UP_WORDS.iter().any(|w| tokens.iter().any(|t| t == w))
}

// =============================================================================
// Tests
// =============================================================================
