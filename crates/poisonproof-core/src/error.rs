//! Error types for detection operations.

use thiserror::Error;

/// Result type for detection operations.
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Errors that can occur while computing statistics or running a detector.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// A statistic was requested over zero values.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Image bytes could not be interpreted as a supported raster format.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A column is not numeric. Informational; the tabular detector skips it.
    #[error("Unsupported column type for '{column}': expected numeric, found {found}")]
    UnsupportedColumnType { column: String, found: String },

    /// Input data is structurally invalid (ragged table, malformed hash).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A threshold or tunable is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for DetectionError {
    fn from(err: serde_yaml::Error) -> Self {
        DetectionError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DetectionError {
    fn from(err: serde_json::Error) -> Self {
        DetectionError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for DetectionError {
    fn from(err: image::ImageError) -> Self {
        DetectionError::Decode(err.to_string())
    }
}

impl DetectionError {
    /// Whether the error only affects one column or image and the scan may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DetectionError::EmptyInput(_) | DetectionError::UnsupportedColumnType { .. }
        )
    }
}
