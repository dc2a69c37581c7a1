//! Static mapping from coarse sector intents to dataset sub-sector values.

use std::collections::BTreeMap;

use unicorn_core::Column;

use crate::sanitizer::{contains_phrase, normalize_key};
use crate::types::Predicate;

/// Built-in intents: (intent, spoken aliases, accepted `primary_sector` values).
static BUILTIN_SECTORS: &[(&str, &[&str], &[&str])] = &[
    (
        "fintech",
        &["fintech", "fintechs", "financial technology"],
        &[
            "Payments",
            "Alternative Lending",
            "Banking Tech",
            "Investment Tech",
            "Internet First Insurance Platforms",
            "Finance & Accounting Tech",
            "Cryptocurrencies",
        ],
    ),
    (
        "logistics",
        &["logistics", "logistic"],
        &["Logistics Tech", "Road Transport Tech"],
    ),
    (
        "ecommerce",
        &["ecommerce", "e commerce"],
        &[
            "Horizontal E-Commerce",
            "B2B E-Commerce",
            "Auto E-Commerce & Content",
            "Online Grocery",
        ],
    ),
    (
        "edtech",
        &["edtech", "edtechs", "education"],
        &["K-12 EdTech", "Test Preparation Tech", "Continued Learning"],
    ),
    (
        "health",
        &["health", "healthtech", "healthcare"],
        &[
            "Healthcare Booking Platforms",
            "Infectious Diseases",
            "Healthcare IT",
        ],
    ),
];

#[derive(Debug, Clone)]
struct SectorIntent {
    aliases: Vec<String>,
    values: Vec<String>,
}

/// Sector intent -> accepted sub-sector values. Read-only once built.
#[derive(Debug, Clone)]
pub struct SectorMap {
    intents: BTreeMap<String, SectorIntent>,
}

impl Default for SectorMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SectorMap {
    /// Map with no intents at all.
    pub fn empty() -> Self {
        Self {
            intents: BTreeMap::new(),
        }
    }

    /// The hand-authored default map.
    pub fn builtin() -> Self {
        let intents = BUILTIN_SECTORS
            .iter()
            .map(|(intent, aliases, values)| {
                (
                    intent.to_string(),
                    SectorIntent {
                        aliases: aliases.iter().map(|a| normalize_key(a)).collect(),
                        values: values.iter().map(|v| v.to_string()).collect(),
                    },
                )
            })
            .collect();
        Self { intents }
    }

    /// Add or replace intents, e.g. from the `[sectors]` config table.
    ///
    /// A replaced built-in keeps its spoken aliases.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        for (intent, values) in overrides {
            let key = normalize_key(intent);
            if key.is_empty() {
                continue;
            }
            let entry = self
                .intents
                .entry(key.clone())
                .or_insert_with(|| SectorIntent {
                    aliases: vec![key.clone()],
                    values: Vec::new(),
                });
            entry.values = values.clone();
        }
        self
    }

    /// Predicates for one intent token. Unknown tokens yield an empty set.
    pub fn resolve(&self, token: &str) -> Vec<Predicate> {
        self.resolve_all(&[normalize_key(token)])
    }

    /// One predicate accepting the union of the intents' values.
    pub fn resolve_all(&self, tokens: &[String]) -> Vec<Predicate> {
        let mut values: Vec<String> = Vec::new();
        for token in tokens {
            if let Some(intent) = self.find(token) {
                for v in &intent.values {
                    if !values.contains(v) {
                        values.push(v.clone());
                    }
                }
            }
        }
        if values.is_empty() {
            Vec::new()
        } else {
            vec![Predicate::one_of(Column::Sector, values)]
        }
    }

    /// Intents mentioned in the given words, in map order.
    ///
    /// Intents with no accepted values are never recognized.
    pub fn recognize(&self, words: &[String]) -> Vec<String> {
        self.intents
            .iter()
            .filter(|(_, intent)| !intent.values.is_empty())
            .filter(|(_, intent)| intent.aliases.iter().any(|a| contains_phrase(words, a)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn intents(&self) -> impl Iterator<Item = &str> {
        self.intents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    fn find(&self, token: &str) -> Option<&SectorIntent> {
        let token = normalize_key(token);
        self.intents.get(&token).or_else(|| {
            self.intents
                .values()
                .find(|intent| intent.aliases.iter().any(|a| *a == token))
        })
    }
}
