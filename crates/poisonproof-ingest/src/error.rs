//! Error types for file ingestion.

use poisonproof_core::DetectionError;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur before or while handing a file to a detector.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File extension is not on the allow-list.
    #[error("Unsupported file type: {0}. Supported types: {1}")]
    UnsupportedFileType(String, String),

    /// File exceeds the configured size ceiling.
    #[error("File too large: {size_mb:.1} MB exceeds maximum of {max_mb} MB")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    /// File has no content.
    #[error("File is empty: {0}")]
    EmptyFile(String),

    /// File does not exist or is not a regular file.
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The detector rejected the input.
    #[error(transparent)]
    Detection(#[from] DetectionError),
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Csv(err.to_string())
    }
}

impl From<serde_yaml::Error> for IngestError {
    fn from(err: serde_yaml::Error) -> Self {
        IngestError::Config(err.to_string())
    }
}
