//! Trait definitions for external capabilities
//!
//! These traits define the boundaries between the pipeline and the outside
//! world. Implementations live in other crates (or in tests).

use crate::{EntryKind, Fingerprint, ReferenceSet};

/// Trait for text generation
///
/// Implemented by the infrastructure layer (folio-llm). Responses are
/// untrusted: they may be empty, fenced, or not in the requested format.
pub trait LlmProvider {
    /// Error type for generation calls
    type Error;

    /// Generate a completion for `prompt`
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Model identifier, for logs and metadata
    fn model_name(&self) -> &str;
}

/// Trait for reading the text layer of a PDF
///
/// Implemented by folio-pdf.
pub trait TextLayer {
    /// Error type for text-layer reads
    type Error;

    /// Text of each page, in page order
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, Self::Error>;
}

/// Trait for optical character recognition over rendered PDF pages
///
/// Implemented by folio-pdf.
pub trait OcrEngine {
    /// Error type for OCR runs
    type Error;

    /// Recognized text of each page, in page order
    fn recognize_pages(&self, pdf: &[u8]) -> Result<Vec<String>, Self::Error>;
}

/// Trait for the content-addressed result cache
///
/// Implemented by folio-store. A missing key is `Ok(None)`, not an error;
/// `put` overwrites whole entries.
pub trait ResultCache {
    /// Error type for cache operations
    type Error;

    /// Read an entry
    fn get(&self, kind: EntryKind, key: &Fingerprint) -> Result<Option<String>, Self::Error>;

    /// Write (or replace) an entry
    fn put(&self, kind: EntryKind, key: &Fingerprint, contents: &str) -> Result<(), Self::Error>;

    /// Check whether an entry exists
    fn contains(&self, kind: EntryKind, key: &Fingerprint) -> Result<bool, Self::Error> {
        Ok(self.get(kind, key)?.is_some())
    }
}

/// Trait for loading a reference dataset
pub trait TableSource {
    /// Error type for loading
    type Error;

    /// Load every row, keeping header order
    fn load(&self) -> Result<ReferenceSet, Self::Error>;
}
