//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider could not be created
    #[error("Provider error: {0}")]
    Llm(#[from] folio_llm::LlmError),

    /// PDF extraction failed
    #[error("Extraction error: {0}")]
    Pdf(#[from] folio_pdf::PdfError),

    /// Generation or reconciliation failed
    #[error("{0}")]
    Extractor(#[from] folio_extractor::ExtractorError),

    /// Cache directory error
    #[error("Cache error: {0}")]
    Store(#[from] folio_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The artifact has a header but no data rows
    #[error("No data rows were generated; the document may not contain the requested data")]
    NoData,

    /// A background task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}
