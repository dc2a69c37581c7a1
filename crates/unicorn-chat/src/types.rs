//! Shared types for the conversational core.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use unicorn_core::{Column, CompanyRecord, RowKey, Tier};

// =============================================================================
// Predicates
// =============================================================================

/// How a predicate tests one column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Case-insensitive equality with any accepted value.
    OneOf(Vec<String>),
    /// Case-insensitive substring match against any needle.
    ContainsAny(Vec<String>),
    /// Numeric value (billions USD) at or above the bound.
    AtLeast(f64),
    /// Numeric value (billions USD) strictly above the bound.
    Above(f64),
    /// Numeric value (billions USD) strictly below the bound.
    Below(f64),
}

/// A (column, accepted-values) filter over company records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: Column,
    pub matcher: Matcher,
}

impl Predicate {
    pub fn one_of(column: Column, values: Vec<String>) -> Self {
        Self {
            column,
            matcher: Matcher::OneOf(values),
        }
    }

    pub fn contains_any(column: Column, needles: Vec<String>) -> Self {
        Self {
            column,
            matcher: Matcher::ContainsAny(needles),
        }
    }

    pub fn valuation_at_least(billions: f64) -> Self {
        Self {
            column: Column::Valuation,
            matcher: Matcher::AtLeast(billions),
        }
    }

    pub fn valuation_above(billions: f64) -> Self {
        Self {
            column: Column::Valuation,
            matcher: Matcher::Above(billions),
        }
    }

    pub fn valuation_below(billions: f64) -> Self {
        Self {
            column: Column::Valuation,
            matcher: Matcher::Below(billions),
        }
    }

    /// Whether the record satisfies this predicate. Missing values never match.
    pub fn matches(&self, record: &CompanyRecord) -> bool {
        match &self.matcher {
            Matcher::OneOf(values) => record
                .text(self.column)
                .is_some_and(|v| values.iter().any(|a| a.eq_ignore_ascii_case(v))),
            Matcher::ContainsAny(needles) => record.text(self.column).is_some_and(|v| {
                let v = v.to_lowercase();
                needles.iter().any(|n| v.contains(&n.to_lowercase()))
            }),
            Matcher::AtLeast(bound) => numeric(record, self.column).is_some_and(|v| v >= *bound),
            Matcher::Above(bound) => numeric(record, self.column).is_some_and(|v| v > *bound),
            Matcher::Below(bound) => numeric(record, self.column).is_some_and(|v| v < *bound),
        }
    }
}

fn numeric(record: &CompanyRecord, column: Column) -> Option<f64> {
    match column {
        Column::Valuation => record.valuation,
        _ => record.text(column).and_then(|v| v.parse().ok()),
    }
}

// =============================================================================
// Resolutions
// =============================================================================

/// Base table a sector resolution runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Dataset,
    Context,
}

/// Why a query could not be mapped onto any tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Nothing recognizable: no company, sector, or filter.
    NoRecognizedTerms,
    /// Only subjective wording ("best", "top") without an anchor.
    Vague,
    /// Attribute filters (or a follow-up reference) with no prior results.
    EmptyContext,
}

/// One candidate interpretation of a query, produced by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Tier 1: a company named directly.
    Entity { key: RowKey, alias: String },
    /// Tier 2: sector intent plus any filters found alongside it.
    Sector {
        intents: Vec<String>,
        predicates: Vec<Predicate>,
        scope: Scope,
    },
    /// Tier 3: filters applied to the current context.
    Contextual { predicates: Vec<Predicate> },
    /// Routed to the clarification policy.
    Unresolvable {
        reason: UnresolvedReason,
        /// Filter dimensions that were recognized anyway.
        dimensions: Vec<Column>,
    },
}

impl Resolution {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Resolution::Entity { .. } => Some(Tier::Entity),
            Resolution::Sector { .. } => Some(Tier::Sector),
            Resolution::Contextual { .. } => Some(Tier::Contextual),
            Resolution::Unresolvable { .. } => None,
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        match self {
            Resolution::Sector { predicates, .. } | Resolution::Contextual { predicates } => {
                predicates.as_slice()
            }
            _ => &[],
        }
    }

    /// Whether execution runs against the current context rather than the dataset.
    pub fn uses_context(&self) -> bool {
        matches!(
            self,
            Resolution::Contextual { .. }
                | Resolution::Sector {
                    scope: Scope::Context,
                    ..
                }
        )
    }

    /// Dimensions this resolution already constrains.
    pub fn dimensions(&self) -> Vec<Column> {
        match self {
            Resolution::Unresolvable { dimensions, .. } => dimensions.clone(),
            _ => {
                let mut dims: Vec<Column> = Vec::new();
                for p in self.predicates() {
                    if !dims.contains(&p.column) {
                        dims.push(p.column);
                    }
                }
                dims
            }
        }
    }
}

// =============================================================================
// ResultSet
// =============================================================================

/// Ordered collection of company records produced by one turn.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<Arc<CompanyRecord>>,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Arc<CompanyRecord>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Arc<CompanyRecord>] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompanyRecord>> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> Vec<RowKey> {
        self.rows.iter().map(|r| r.key).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn contains(&self, key: RowKey) -> bool {
        self.rows.iter().any(|r| r.key == key)
    }

    /// Every row of `self` also appears in `other`.
    pub fn is_subset_of(&self, other: &ResultSet) -> bool {
        let keys: HashSet<RowKey> = other.rows.iter().map(|r| r.key).collect();
        self.rows.iter().all(|r| keys.contains(&r.key))
    }

    /// Append the rows of `other` not already present.
    pub fn extend_unique(&mut self, other: ResultSet) {
        for row in other.rows {
            if !self.contains(row.key) {
                self.rows.push(row);
            }
        }
    }

    pub fn summary(&self, tier: Option<Tier>, max_names: usize) -> ResultSummary {
        ResultSummary {
            tier,
            rows: self.len(),
            names: self
                .rows
                .iter()
                .take(max_names)
                .map(|r| r.name.clone())
                .collect(),
        }
    }
}

/// Compact description of a result set for history and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub tier: Option<Tier>,
    pub rows: usize,
    pub names: Vec<String>,
}

// =============================================================================
// Turn outcomes
// =============================================================================

/// A resolved answer.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub tier: Tier,
    pub results: ResultSet,
    pub suggestions: Vec<String>,
}

/// What triggered a clarification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarifyReason {
    Unresolvable(UnresolvedReason),
    /// Too many rows and no disambiguating entity.
    TooBroad { rows: usize },
    /// Zero rows, and some filter matches nothing anywhere in the dataset.
    AmbiguousEmpty,
}

/// A clarifying question asked instead of answering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clarification {
    pub prompt: String,
    pub reason: ClarifyReason,
    /// Dimensions the user is asked to specify.
    pub dimensions: Vec<Column>,
}

/// Outcome of a successfully handled turn.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Answer(Answer),
    Clarification(Clarification),
}

impl TurnOutcome {
    /// Text to show the user.
    pub fn text(&self) -> &str {
        match self {
            TurnOutcome::Answer(a) => &a.text,
            TurnOutcome::Clarification(c) => &c.prompt,
        }
    }

    pub fn is_clarification(&self) -> bool {
        matches!(self, TurnOutcome::Clarification(_))
    }
}

/// What a turn hands to the conversation state.
#[derive(Debug, Clone)]
pub enum TurnResult {
    Resolved {
        query: String,
        tier: Tier,
        results: ResultSet,
    },
    Clarification { query: String },
}

/// One committed entry of conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub summary: ResultSummary,
    pub at: DateTime<Utc>,
}
