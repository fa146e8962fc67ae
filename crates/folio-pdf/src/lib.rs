//! Folio PDF Text Extraction
//!
//! Turns PDF bytes into page-tagged text, preferring the embedded text
//! layer and falling back to OCR when that layer is unreadable or looks
//! corrupted.
//!
//! # Architecture
//!
//! ```text
//! PDF bytes → fingerprint → cache hit? ──yes──→ cached text
//!                               │ no
//!                               ▼
//!                          text layer ──ok + QualityGate pass──→ text
//!                               │ error / gate rejects
//!                               ▼
//!                              OCR ──ok──→ text
//!                               │ error
//!                               ▼
//!                        failure marker text
//! ```
//!
//! Whatever path produces the text, it is written to the cache before it
//! is returned.

#![warn(missing_docs)]

pub mod error;
pub mod extractor;
pub mod lopdf_layer;
pub mod ocr;
pub mod quality;

pub use error::PdfError;
pub use extractor::TextExtractor;
pub use lopdf_layer::LopdfTextLayer;
pub use ocr::{OcrConfig, TesseractOcr};
pub use quality::{QualityGate, QualityVerdict};
