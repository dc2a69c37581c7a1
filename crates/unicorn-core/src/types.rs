use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Stable row key of a record within the dataset it was loaded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey(pub usize);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Columns
// =============================================================================

/// Dataset columns the core knows how to filter on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Name,
    Sector,
    Location,
    Valuation,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Sector => "sector",
            Column::Location => "location",
            Column::Valuation => "valuation",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tier
// =============================================================================

/// Resolution strategy, in precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Direct lookup of a named company.
    Entity,
    /// Sector intent mapped onto sub-sector values.
    Sector,
    /// Attribute filters applied to the current context.
    Contextual,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Entity => "entity",
            Tier::Sector => "sector",
            Tier::Contextual => "contextual",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CompanyRecord
// =============================================================================

/// One immutable row of the company catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub key: RowKey,
    pub name: String,
    /// Primary sector / sub-sector value, e.g. "Payments".
    pub sector: Option<String>,
    pub location: Option<String>,
    /// Valuation in billions of USD, when parseable.
    pub valuation: Option<f64>,
    /// Valuation cell as it appeared in the source.
    pub valuation_text: Option<String>,
    pub description: Option<String>,
    /// Remaining columns, keyed by header.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl CompanyRecord {
    /// Minimal record with only a name; other fields can be filled in by the caller.
    pub fn new(key: RowKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            sector: None,
            location: None,
            valuation: None,
            valuation_text: None,
            description: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_valuation(mut self, billions: f64) -> Self {
        self.valuation = Some(billions);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Textual value of a filterable column.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Name => Some(self.name.as_str()),
            Column::Sector => self.sector.as_deref(),
            Column::Location => self.location.as_deref(),
            Column::Valuation => self.valuation_text.as_deref(),
        }
    }
}
