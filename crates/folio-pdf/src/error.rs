//! Error types for PDF extraction

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting text
///
/// Text-layer and OCR failures are normally absorbed by the extractor
/// (fallback and failure marker). They surface as errors only when a
/// capability is called directly.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Source file does not exist
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Source file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Text layer could not be parsed
    #[error("Text layer error: {0}")]
    TextLayer(String),

    /// OCR toolchain failed
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Cache read or write failed
    #[error("Cache error: {0}")]
    Cache(String),
}
