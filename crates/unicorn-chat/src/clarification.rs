//! Clarification policy.
//!
//! Decides whether a turn should ask the user to disambiguate instead of
//! answering, and which dimensions the question should mention.

use tracing::debug;

use unicorn_core::{Column, Dataset};

use crate::types::{Clarification, ClarifyReason, Resolution, ResultSet, UnresolvedReason};

/// Dimensions a user can narrow a query by, in prompt order.
const NARROWING_DIMENSIONS: [Column; 3] = [Column::Sector, Column::Location, Column::Valuation];

const VAGUE_PROMPT: &str = "Could you verify which specific sector or criteria you are looking for? (e.g., Valuation, Sector, Location)";

#[derive(Debug, Clone)]
pub struct ClarificationPolicy {
    /// Result sizes strictly above this trigger a clarification.
    pub threshold: usize,
}

impl ClarificationPolicy {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn should_clarify(
        &self,
        resolution: &Resolution,
        results: &ResultSet,
        dataset: &Dataset,
    ) -> bool {
        self.evaluate(resolution, results, dataset).is_some()
    }

    /// The clarification to ask, if any.
    ///
    /// - Unresolvable resolutions always clarify.
    /// - Entity lookups never clarify.
    /// - More rows than `threshold` clarifies with the unconstrained dimensions.
    /// - Zero rows clarifies only when some predicate matches nothing in the
    ///   whole dataset. Otherwise the empty answer is genuine.
    pub fn evaluate(
        &self,
        resolution: &Resolution,
        results: &ResultSet,
        dataset: &Dataset,
    ) -> Option<Clarification> {
        let clarification = match resolution {
            Resolution::Unresolvable { reason, dimensions } => {
                Some(Self::unresolved(*reason, dimensions))
            }
            Resolution::Entity { .. } => None,
            _ if results.len() > self.threshold => {
                let constrained = resolution.dimensions();
                let missing: Vec<Column> = NARROWING_DIMENSIONS
                    .iter()
                    .copied()
                    .filter(|d| !constrained.contains(d))
                    .collect();
                let dimensions = if missing.is_empty() {
                    NARROWING_DIMENSIONS.to_vec()
                } else {
                    missing
                };
                Some(Clarification {
                    prompt: format!(
                        "I found {} companies matching that. Could you narrow it down by {}?",
                        results.len(),
                        join_dimensions(&dimensions)
                    ),
                    reason: ClarifyReason::TooBroad {
                        rows: results.len(),
                    },
                    dimensions,
                })
            }
            _ if results.is_empty() => {
                let ungrounded: Vec<Column> = resolution
                    .predicates()
                    .iter()
                    .filter(|p| !dataset.iter().any(|r| p.matches(r)))
                    .map(|p| p.column)
                    .fold(Vec::new(), |mut acc, c| {
                        if !acc.contains(&c) {
                            acc.push(c);
                        }
                        acc
                    });
                if ungrounded.is_empty() {
                    None
                } else {
                    Some(Clarification {
                        prompt: format!(
                            "I couldn't match the {} you mentioned to anything in the dataset. Could you rephrase it or pick a different one?",
                            join_dimensions(&ungrounded)
                        ),
                        reason: ClarifyReason::AmbiguousEmpty,
                        dimensions: ungrounded,
                    })
                }
            }
            _ => None,
        };

        if let Some(c) = &clarification {
            debug!(reason = ?c.reason, dimensions = ?c.dimensions, "Clarification triggered");
        }
        clarification
    }

    /// Clarification for a query no tier could take.
    pub fn unresolved(reason: UnresolvedReason, recognized: &[Column]) -> Clarification {
        let (prompt, dimensions) = match reason {
            UnresolvedReason::Vague => (VAGUE_PROMPT.to_string(), NARROWING_DIMENSIONS.to_vec()),
            UnresolvedReason::EmptyContext => {
                let prompt = if recognized.is_empty() {
                    "There are no previous results to refer to yet. Which sector are you interested in? (e.g., Fintech, Logistics, E-commerce)".to_string()
                } else {
                    format!(
                        "I can filter by {} once we have some companies to look at. Which sector are you interested in? (e.g., Fintech, Logistics, E-commerce)",
                        join_dimensions(recognized)
                    )
                };
                (prompt, vec![Column::Sector])
            }
            UnresolvedReason::NoRecognizedTerms => (
                "I'm not sure what you're looking for. Could you name a company, or tell me the sector, location, or valuation you have in mind?".to_string(),
                NARROWING_DIMENSIONS.to_vec(),
            ),
        };
        Clarification {
            prompt,
            reason: ClarifyReason::Unresolvable(reason),
            dimensions,
        }
    }
}

fn join_dimensions(dimensions: &[Column]) -> String {
    let names: Vec<&str> = dimensions.iter().map(|d| d.as_str()).collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}
