//! Folio Domain Layer
//!
//! Value objects and capability traits shared by every other Folio crate.
//! Nothing in here performs I/O: PDF parsing, OCR, generation and caching are
//! expressed as traits and implemented by the infrastructure crates.
//!
//! ## Key Concepts
//!
//! - **Fingerprint**: SHA-256 digest of content, the only cache key
//! - **ExtractedText**: page-tagged text of one document
//! - **FormatContract**: what a generation request must produce (CSV or records)
//! - **GeneratedArtifact**: the normalized output of a generation request
//! - **ReferenceSet**: canonical rows a record set is reconciled against
//! - **MatchedRecord**: an extracted record annotated with its best reference match

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod confidence;
pub mod document;
pub mod fingerprint;
pub mod reference;
pub mod traits;

// Re-exports for convenience
pub use artifact::{EntryKind, FormatContract, GeneratedArtifact, GenerationRequest, Record};
pub use confidence::MatchConfidence;
pub use document::{ExtractedText, FallbackReason, PageSegment, TextOrigin};
pub use fingerprint::Fingerprint;
pub use reference::{detect_identifier_column, MatchedRecord, ReferenceSet};
