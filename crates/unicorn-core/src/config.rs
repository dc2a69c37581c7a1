use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, UnicornError};

/// Top-level configuration for the Unicorn application.
///
/// Loaded from `~/.unicorn/config.toml` by default. Each section corresponds
/// to one collaborator of the conversational core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnicornConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    /// Extra or overriding sector intents: intent token -> accepted sub-sectors.
    #[serde(default)]
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl UnicornConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: UnicornConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| UnicornError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Optional file that receives a copy of the log output.
    pub log_file: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Dataset location and schema.
///
/// The column names are the contract between ingestion and the sector map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the CSV file.
    pub path: String,
    /// Column holding the company name (required).
    pub name_column: String,
    /// Column holding the primary sector / sub-sector.
    pub sector_column: String,
    /// Column holding the headquarters location.
    pub location_column: String,
    /// Column holding the valuation.
    pub valuation_column: String,
    /// Column holding the free-text company background.
    pub description_column: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "tracxn.csv".to_string(),
            name_column: "Company".to_string(),
            sector_column: "primary_sector".to_string(),
            location_column: "location".to_string(),
            valuation_column: "valuation".to_string(),
            description_column: "company_background".to_string(),
        }
    }
}

/// Conversational core tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum input length in characters after trimming.
    pub max_input_length: usize,
    /// Result sizes above this ask the user to narrow down.
    pub clarification_threshold: usize,
    /// Companies listed per answer.
    pub display_limit: usize,
    /// Valuation (billions USD) at or above which a company counts as "high valuation".
    pub high_valuation_billions: f64,
    /// History entries retained by the session layer.
    pub history_cap: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_input_length: 500,
            clarification_threshold: 25,
            display_limit: 5,
            high_valuation_billions: 5.0,
            history_cap: 50,
        }
    }
}
