//! Dataset ingestion.
//!
//! Reads the company catalog from CSV into immutable [`CompanyRecord`]s.
//! Handles the encoding fallback (UTF-8, then Latin-1), trims every cell and
//! parses valuations into billions of USD.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::DatasetConfig;
use crate::error::{Result, UnicornError};
use crate::types::{CompanyRecord, RowKey};

/// Text encoding the dataset was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Latin1,
}

/// The full, read-only company catalog.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Arc<CompanyRecord>>,
}

impl Dataset {
    /// Build a dataset from in-memory records.
    ///
    /// Row keys are reassigned to match each record's position.
    pub fn from_records(records: Vec<CompanyRecord>) -> Self {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                r.key = RowKey(i);
                Arc::new(r)
            })
            .collect();
        Self { records }
    }

    /// Load the dataset from a CSV file on disk.
    pub fn from_csv_path(path: &Path, config: &DatasetConfig) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let (text, encoding) = decode_bytes(&bytes);
        if encoding == SourceEncoding::Latin1 {
            warn!(path = %path.display(), "UTF-8 decode failed, fell back to Latin-1");
        }
        let dataset = Self::from_csv_str(&text, config)?;
        info!(
            path = %path.display(),
            records = dataset.len(),
            encoding = ?encoding,
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse CSV text (header row first) into a dataset.
    pub fn from_csv_str(text: &str, config: &DatasetConfig) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let name_idx = find(&config.name_column).ok_or_else(|| UnicornError::MissingColumn {
            column: config.name_column.clone(),
        })?;
        let sector_idx = find(&config.sector_column);
        let location_idx = find(&config.location_column);
        let valuation_idx = find(&config.valuation_column);
        let description_idx = find(&config.description_column);

        let known = [
            Some(name_idx),
            sector_idx,
            location_idx,
            valuation_idx,
            description_idx,
        ];

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for row in reader.records() {
            let row = row?;
            let cell = |idx: Option<usize>| -> Option<String> {
                idx.and_then(|i| row.get(i))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };

            let Some(name) = cell(Some(name_idx)) else {
                skipped += 1;
                continue;
            };

            let valuation_text = cell(valuation_idx);
            let mut attributes = BTreeMap::new();
            for (i, header) in headers.iter().enumerate() {
                if known.contains(&Some(i)) {
                    continue;
                }
                if let Some(value) = cell(Some(i)) {
                    attributes.insert(header.clone(), value);
                }
            }

            records.push(CompanyRecord {
                key: RowKey(records.len()),
                name,
                sector: cell(sector_idx),
                location: cell(location_idx),
                valuation: valuation_text.as_deref().and_then(parse_valuation),
                valuation_text,
                description: cell(description_idx),
                attributes,
            });
        }

        if skipped > 0 {
            warn!(skipped, "Skipped rows without a company name");
        }

        Ok(Self::from_records(records))
    }

    /// Record for a row key, or `None` when the key is stale.
    pub fn get(&self, key: RowKey) -> Option<&Arc<CompanyRecord>> {
        self.records.get(key.0)
    }

    pub fn records(&self) -> &[Arc<CompanyRecord>] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompanyRecord>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decode raw bytes as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so the
/// fallback never fails.
pub fn decode_bytes(bytes: &[u8]) -> (String, SourceEncoding) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), SourceEncoding::Utf8),
        Err(_) => (
            bytes.iter().map(|&b| char::from(b)).collect(),
            SourceEncoding::Latin1,
        ),
    }
}

/// Parse a valuation cell into billions of USD.
///
/// Accepts `$1.2B`, `1.2 bn`, `1,200M`, `850 million`, `$2 billion` and plain
/// numbers (taken as billions).
pub fn parse_valuation(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '~'))
        .collect();
    let cleaned = cleaned.strip_prefix("usd").unwrap_or(&cleaned);

    let split = cleaned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(cleaned.len());
    let (number, unit) = cleaned.split_at(split);
    let value: f64 = number.parse().ok()?;

    let scale = match unit {
        "" | "b" | "bn" | "billion" | "billions" => 1.0,
        "m" | "mn" | "million" | "millions" => 0.001,
        "t" | "tn" | "trillion" => 1000.0,
        "k" | "thousand" => 0.000_001,
        _ => return None,
    };
    Some(value * scale)
}
