//! Error types for the cohort engine.
//!
//! Hard failures are reserved for loading: a dataset that cannot be fetched or
//! an imported file that lacks required columns. Query-time operations never
//! return errors; they fall back to neutral values instead.

use crate::sources::DatasetKind;
use thiserror::Error;

/// The main error type for the cohort engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An imported dataset is missing one or more required columns.
    #[error("Schema validation failed for {dataset}: missing columns [{}]", missing.join(", "))]
    SchemaValidation {
        /// Dataset whose header was checked
        dataset: DatasetKind,
        /// Every required column absent from the header
        missing: Vec<String>,
    },

    /// A dataset source could not be retrieved or decoded.
    #[error("Failed to fetch {dataset}: {message}")]
    Fetch {
        /// Dataset being fetched
        dataset: DatasetKind,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from Arrow CSV reading or writing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization of reports.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Creates a fetch error for the given dataset.
    pub fn fetch(dataset: DatasetKind, message: impl Into<String>) -> Self {
        Self::Fetch {
            dataset,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a fetch error that keeps the underlying cause.
    pub fn fetch_with_source(
        dataset: DatasetKind,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Fetch {
            dataset,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a schema validation error listing the missing columns.
    pub fn schema_validation(dataset: DatasetKind, missing: Vec<String>) -> Self {
        Self::SchemaValidation { dataset, missing }
    }

    /// Returns the dataset this error concerns, if any.
    pub fn dataset(&self) -> Option<DatasetKind> {
        match self {
            Self::SchemaValidation { dataset, .. } | Self::Fetch { dataset, .. } => Some(*dataset),
            _ => None,
        }
    }
}
