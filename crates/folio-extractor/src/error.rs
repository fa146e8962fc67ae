//! Error types for generation and reconciliation

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating or reconciling artifacts
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error (transport, HTTP status, unreadable body)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Generation call exceeded its time bound
    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    /// Result cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Nothing to generate from
    #[error("Input text is empty")]
    EmptyText,

    /// No chunk produced usable output
    #[error("No structured data in the model output ({chunks} chunk(s) tried)")]
    NoStructuredData {
        /// Chunks attempted
        chunks: usize,
    },

    /// Reconciliation response could not be used
    #[error("Matching failed: {reason}")]
    Matching {
        /// What went wrong
        reason: String,
        /// The model output, for diagnosis
        raw_response: String,
    },

    /// Reference dataset has no identifier column
    #[error("Reference data has no identifier column (expected a column containing 'uuid' or named 'id'); columns: {}", columns.join(", "))]
    MissingIdentifierColumn {
        /// Columns that were present
        columns: Vec<String>,
    },

    /// Reference dataset could not be read
    #[error("Reference data error: {0}")]
    Reference(String),

    /// Output file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for ExtractorError {
    fn from(e: csv::Error) -> Self {
        ExtractorError::Reference(e.to_string())
    }
}
