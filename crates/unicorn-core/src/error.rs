use thiserror::Error;

/// Top-level error type for the Unicorn system.
///
/// Covers the ambient collaborators around the conversational core:
/// configuration, dataset ingestion and serialization. The core itself
/// never surfaces these during a turn.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UnicornError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Dataset is missing required column: {column}")]
    MissingColumn { column: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for UnicornError {
    fn from(err: toml::de::Error) -> Self {
        UnicornError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for UnicornError {
    fn from(err: toml::ser::Error) -> Self {
        UnicornError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for UnicornError {
    fn from(err: serde_json::Error) -> Self {
        UnicornError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for UnicornError {
    fn from(err: csv::Error) -> Self {
        UnicornError::Dataset(err.to_string())
    }
}

/// A specialized `Result` type for Unicorn operations.
pub type Result<T> = std::result::Result<T, UnicornError>;
