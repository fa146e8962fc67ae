//! Result types for generation and reconciliation

use folio_domain::{Fingerprint, GeneratedArtifact, MatchedRecord};
use serde::Serialize;

/// Result of a generation job
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The normalized, merged artifact
    pub artifact: GeneratedArtifact,

    /// Metadata about the job
    pub metadata: GenerationMetadata,
}

/// A chunk whose response could not be normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFailure {
    /// Zero-based chunk index
    pub chunk_index: usize,

    /// Reason for failure
    pub reason: String,

    /// Raw model output for the chunk
    pub raw_response: String,
}

/// Metadata about a generation job
#[derive(Debug, Clone)]
pub struct GenerationMetadata {
    /// Cache key of the request
    pub fingerprint: Fingerprint,

    /// Name of the LLM model used
    pub model_name: String,

    /// True when the artifact came from the cache and no model was called
    pub from_cache: bool,

    /// Chunks the payload was split into (0 on a cache hit)
    pub chunk_count: usize,

    /// Chunks whose output was discarded
    pub failures: Vec<ChunkFailure>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Result of a reconciliation job
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    /// One entry per input record, in input order
    pub matches: Vec<MatchedRecord>,

    /// Document-level summary, when the model supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Reference column used as identifier
    pub identifier_column: String,

    /// Reference rows embedded in the prompt
    pub reference_rows_sent: usize,

    /// Extracted records sent for matching
    pub records_sent: usize,

    /// Returned identifiers discarded as unknown
    pub discarded_ids: Vec<String>,
}

impl Reconciliation {
    /// Number of records with a match
    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| m.matched_id.is_some()).count()
    }
}
