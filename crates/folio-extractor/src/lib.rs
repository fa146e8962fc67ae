//! Folio Extractor
//!
//! Turns extracted document text into structured artifacts with an LLM,
//! and reconciles extracted records against a reference dataset.
//!
//! # Architecture
//!
//! ```text
//! text + instruction → cache? → Chunker → PromptBuilder → LLM → normalizer → merge → cache
//! records + reference rows → Reconciler → LLM → MatchedRecord per record
//! ```
//!
//! # Key Features
//!
//! - **Cache-first**: identical text and instruction never reach the model twice
//! - **Chunk tolerance**: one unparseable chunk does not fail the job
//! - **Tolerant parsing**: fences, trailing commas and surrounding prose are repaired
//! - **Identifier checks**: reconciliation refuses reference data without an id
//!   column, and drops identifiers the model made up
//!
//! # Example Usage
//!
//! ```no_run
//! use folio_domain::{FormatContract, GenerationRequest};
//! use folio_extractor::{ArtifactGenerator, PipelineConfig};
//! use folio_llm::MockProvider;
//! use folio_store::MemoryCache;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("date,event\n2024-01-01,launch");
//! let generator = ArtifactGenerator::new(llm, MemoryCache::new(), PipelineConfig::default());
//!
//! let request = GenerationRequest::new("--- Page 1 Content ---\n...", "list all dates", FormatContract::Csv);
//! let outcome = generator.generate(&request).await?;
//!
//! println!("{} rows", outcome.artifact.row_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod client;
mod config;
mod error;
pub mod export;
mod generator;
pub mod normalizer;
mod prompt;
mod reconciler;
mod reference;
mod types;

#[cfg(test)]
mod tests;

pub use chunking::{chunk_text, Chunks};
pub use client::GenerationClient;
pub use config::{PipelineConfig, ReconcileMode};
pub use error::ExtractorError;
pub use generator::{merge_artifacts, merge_csv, ArtifactGenerator};
pub use normalizer::RepairPass;
pub use prompt::{PromptBuilder, ReconcilePromptBuilder};
pub use reconciler::Reconciler;
pub use reference::{read_reference, CsvTableSource};
pub use types::{ChunkFailure, GenerationMetadata, GenerationOutcome, Reconciliation};
