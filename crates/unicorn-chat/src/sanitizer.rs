//! Input sanitization and text normalization helpers.
//!
//! Every raw message passes through [`Sanitizer::sanitize`] before any
//! matching. The helpers at the bottom give the index, sector map and
//! classifier one shared notion of "words".

use std::sync::LazyLock;

use regex::Regex;

use crate::error::InvalidInputError;

/// Script-injection-like sequences rejected outright.
static INJECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<\s*/?\s*(?:script|iframe|object|embed|img|svg)\b|javascript\s*:|\bon[a-z]+\s*=|\$\{|\{\{|\beval\s*\(",
    )
    .expect("Invalid injection regex")
});

/// Characters outside this set are stripped during normalization.
static STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s?.,'&-]").expect("Invalid strip regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Validates and normalizes raw user input.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    max_length: usize,
}

impl Sanitizer {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Sanitize raw text.
    ///
    /// Rejects empty, over-length, control-character and injection-like
    /// input; otherwise strips unsupported punctuation and collapses
    /// whitespace. Idempotent on its own output.
    pub fn sanitize(&self, raw: &str) -> Result<String, InvalidInputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidInputError::Empty);
        }
        if trimmed.chars().count() > self.max_length {
            return Err(InvalidInputError::TooLong {
                max: self.max_length,
            });
        }
        if trimmed.chars().any(|c| c.is_control() && !c.is_whitespace()) {
            return Err(InvalidInputError::DisallowedContent(
                "control character".to_string(),
            ));
        }
        if let Some(m) = INJECTION_RE.find(trimmed) {
            return Err(InvalidInputError::DisallowedContent(format!(
                "script-like sequence '{}'",
                m.as_str()
            )));
        }

        let stripped = STRIP_RE.replace_all(trimmed, "");
        let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");
        let clean = collapsed.trim();
        if clean.is_empty() {
            return Err(InvalidInputError::Empty);
        }
        Ok(clean.to_string())
    }
}

// =============================================================================
// Shared normalization helpers
// =============================================================================

/// Lowercased alphanumeric words of `text`.
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Canonical lookup key: lowercased words joined by single spaces.
pub fn normalize_key(text: &str) -> String {
    words(text).join(" ")
}

/// Whether `phrase` (already a normalized key) occurs as consecutive words.
pub fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split(' ').filter(|w| !w.is_empty()).collect();
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words
        .windows(needle.len())
        .any(|window| window.iter().zip(&needle).all(|(w, n)| w == n))
}
