//! Exact-match company name index.
//!
//! Maps normalized names and aliases to row keys. Built once from the
//! dataset; rebuild only when the dataset is reloaded.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use unicorn_core::{Dataset, RowKey};

use crate::sanitizer::{normalize_key, words};

/// Trailing words dropped to form a short alias ("Acme Technologies" -> "acme").
static CORPORATE_SUFFIXES: &[&str] = &[
    "pvt",
    "private",
    "ltd",
    "limited",
    "inc",
    "llp",
    "corp",
    "technologies",
    "technology",
    "tech",
    "labs",
    "india",
];

/// Derived aliases shorter than this are not indexed.
const MIN_DERIVED_ALIAS_LEN: usize = 3;

/// A company mentioned in free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMention {
    pub key: RowKey,
    /// The alias that matched, in normalized form.
    pub alias: String,
}

/// Normalized alias -> row key.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    aliases: HashMap<String, RowKey>,
    /// Longest alias, in words; bounds the n-gram scan.
    max_alias_words: usize,
}

impl EntityIndex {
    /// Build the index from every record's name.
    ///
    /// Full names are indexed first (the first row wins on duplicate names).
    /// Derived aliases (compacted name, name without corporate suffix) are
    /// added only when they do not collide with another company.
    pub fn build(dataset: &Dataset) -> Self {
        let mut aliases: HashMap<String, RowKey> = HashMap::new();

        for record in dataset.iter() {
            let key = normalize_key(&record.name);
            if key.is_empty() {
                continue;
            }
            if let Some(existing) = aliases.get(&key) {
                debug!(name = %record.name, first = %existing, "Duplicate company name, keeping first row");
                continue;
            }
            aliases.insert(key, record.key);
        }

        let full_names: HashSet<String> = aliases.keys().cloned().collect();
        let mut derived: HashMap<String, RowKey> = HashMap::new();
        let mut ambiguous: HashSet<String> = HashSet::new();

        for record in dataset.iter() {
            for alias in derived_aliases(&record.name) {
                if full_names.contains(&alias) || ambiguous.contains(&alias) {
                    continue;
                }
                match derived.get(&alias) {
                    Some(existing) if *existing != record.key => {
                        derived.remove(&alias);
                        ambiguous.insert(alias);
                    }
                    Some(_) => {}
                    None => {
                        derived.insert(alias, record.key);
                    }
                }
            }
        }

        if !ambiguous.is_empty() {
            debug!(count = ambiguous.len(), "Dropped ambiguous aliases");
        }
        aliases.extend(derived);

        let max_alias_words = aliases
            .keys()
            .map(|a| a.split(' ').count())
            .max()
            .unwrap_or(0);

        Self {
            aliases,
            max_alias_words,
        }
    }

    /// Exact, case-insensitive lookup of a name or alias.
    pub fn lookup(&self, text: &str) -> Option<RowKey> {
        self.aliases.get(&normalize_key(text)).copied()
    }

    /// Every distinct company mentioned in `text`, in order of appearance.
    ///
    /// Scans word n-grams longest-first so "money view" beats a shorter
    /// alias starting at the same word.
    pub fn find_mentions(&self, text: &str) -> Vec<EntityMention> {
        let tokens = words(text);
        let mut found: Vec<EntityMention> = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let longest = self.max_alias_words.min(tokens.len() - i);
            let mut matched = 0;
            for len in (1..=longest).rev() {
                let candidate = tokens[i..i + len].join(" ");
                if let Some(&key) = self.aliases.get(&candidate) {
                    if !found.iter().any(|m| m.key == key) {
                        found.push(EntityMention {
                            key,
                            alias: candidate,
                        });
                    }
                    matched = len;
                    break;
                }
            }
            i += matched.max(1);
        }

        found
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Secondary aliases for a company name.
fn derived_aliases(name: &str) -> Vec<String> {
    let tokens = words(name);
    let mut out = Vec::new();

    if tokens.len() > 1 {
        out.push(tokens.concat());
    }

    let mut trimmed: &[String] = &tokens;
    while let Some((last, rest)) = trimmed.split_last() {
        if rest.is_empty() || !CORPORATE_SUFFIXES.contains(&last.as_str()) {
            break;
        }
        trimmed = rest;
    }
    if trimmed.len() < tokens.len() {
        out.push(trimmed.join(" "));
    }

    out.retain(|a| a.chars().count() >= MIN_DERIVED_ALIAS_LEN);
    out
}
