//! Cache-first artifact generation

use crate::chunking::Chunks;
use crate::client::GenerationClient;
use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use crate::normalizer::normalize;
use crate::prompt::PromptBuilder;
use crate::types::{ChunkFailure, GenerationMetadata, GenerationOutcome};
use folio_domain::traits::{LlmProvider, ResultCache};
use folio_domain::{FormatContract, Fingerprint, GeneratedArtifact, GenerationRequest, Record};
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Turns text plus an instruction into a cached artifact
///
/// Chunks are processed one after another, in order. A chunk whose output
/// cannot be normalized contributes nothing; the job fails only when no
/// chunk contributed. Transport errors and timeouts fail the whole job.
pub struct ArtifactGenerator<L, C>
where
    L: LlmProvider,
    C: ResultCache,
{
    client: GenerationClient<L>,
    cache: C,
    config: PipelineConfig,
}

impl<L, C> ArtifactGenerator<L, C>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    C: ResultCache,
    C::Error: Display,
{
    /// Create a new generator
    pub fn new(provider: L, cache: C, config: PipelineConfig) -> Self {
        let client = GenerationClient::new(provider, config.generation_timeout());
        Self::with_client(client, cache, config)
    }

    /// Create a generator around an existing client
    pub fn with_client(client: GenerationClient<L>, cache: C, config: PipelineConfig) -> Self {
        Self {
            client,
            cache,
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Client used for model calls
    pub fn client(&self) -> &GenerationClient<L> {
        &self.client
    }

    /// Generate (or load from cache) the artifact for `request`
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, ExtractorError> {
        let start_time = Instant::now();
        let fingerprint = request.fingerprint();

        if let Some(artifact) = self.load_cached(&fingerprint, &request.contract)? {
            info!("Artifact cache hit for {}", fingerprint.short());
            return Ok(GenerationOutcome {
                artifact,
                metadata: GenerationMetadata {
                    fingerprint,
                    model_name: self.client.model_name().to_string(),
                    from_cache: true,
                    chunk_count: 0,
                    failures: Vec::new(),
                    processing_time_ms: start_time.elapsed().as_millis() as u64,
                },
            });
        }

        if request.payload.trim().is_empty() {
            return Err(ExtractorError::EmptyText);
        }

        let chunks = Chunks::new(&request.payload, self.config.max_chunk_size);
        let chunk_count = chunks.total();
        info!(
            "Generating artifact {} ({} chars, {} chunk(s))",
            fingerprint.short(),
            request.payload.len(),
            chunk_count
        );

        let mut parts = Vec::new();
        let mut failures = Vec::new();

        for (idx, chunk) in chunks.enumerate() {
            debug!("Processing chunk {}/{}", idx + 1, chunk_count);

            let prompt = PromptBuilder::new(chunk, &request.instruction, &request.contract).build();
            let raw = self.client.complete(&prompt).await?;

            match normalize(&raw, &request.contract) {
                Some(artifact) => parts.push(artifact),
                None => {
                    warn!("Chunk {} produced no structured data", idx + 1);
                    failures.push(ChunkFailure {
                        chunk_index: idx,
                        reason: "no structured data in response".to_string(),
                        raw_response: raw,
                    });
                }
            }
        }

        let artifact = merge_artifacts(parts)
            .ok_or(ExtractorError::NoStructuredData { chunks: chunk_count })?;

        self.store(&fingerprint, &request.contract, &artifact)?;

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Generation complete: {} rows, {} failed chunk(s), {}ms",
            artifact.row_count(),
            failures.len(),
            processing_time_ms
        );

        Ok(GenerationOutcome {
            artifact,
            metadata: GenerationMetadata {
                fingerprint,
                model_name: self.client.model_name().to_string(),
                from_cache: false,
                chunk_count,
                failures,
                processing_time_ms,
            },
        })
    }

    fn load_cached(
        &self,
        key: &Fingerprint,
        contract: &FormatContract,
    ) -> Result<Option<GeneratedArtifact>, ExtractorError> {
        let Some(raw) = self
            .cache
            .get(contract.entry_kind(), key)
            .map_err(|e| ExtractorError::Cache(e.to_string()))?
        else {
            return Ok(None);
        };

        match contract {
            FormatContract::Csv => Ok(Some(GeneratedArtifact::Csv(raw))),
            FormatContract::Records { .. } => match serde_json::from_str::<Vec<Record>>(&raw) {
                Ok(records) => Ok(Some(GeneratedArtifact::Records(records))),
                Err(e) => {
                    warn!("Ignoring unreadable cache entry {}: {}", key.short(), e);
                    Ok(None)
                }
            },
        }
    }

    fn store(
        &self,
        key: &Fingerprint,
        contract: &FormatContract,
        artifact: &GeneratedArtifact,
    ) -> Result<(), ExtractorError> {
        let serialized = match artifact {
            GeneratedArtifact::Csv(csv) => csv.clone(),
            GeneratedArtifact::Records(records) => serde_json::to_string_pretty(records)
                .map_err(|e| ExtractorError::Cache(e.to_string()))?,
        };
        self.cache
            .put(contract.entry_kind(), key, &serialized)
            .map_err(|e| ExtractorError::Cache(e.to_string()))
    }
}

/// Merge per-chunk artifacts in chunk order
///
/// Returns `None` when nothing contributed: no parts at all, or record
/// parts that are all empty.
pub fn merge_artifacts(parts: Vec<GeneratedArtifact>) -> Option<GeneratedArtifact> {
    let mut csv_parts = Vec::new();
    let mut records = Vec::new();
    let mut saw_records = false;

    for part in parts {
        match part {
            GeneratedArtifact::Csv(csv) => csv_parts.push(csv),
            GeneratedArtifact::Records(mut r) => {
                saw_records = true;
                records.append(&mut r);
            }
        }
    }

    if saw_records {
        return (!records.is_empty()).then_some(GeneratedArtifact::Records(records));
    }
    merge_csv(&csv_parts).map(GeneratedArtifact::Csv)
}

/// Concatenate CSV chunks under the header of the first one
///
/// A later chunk whose first non-blank line repeats that header has it
/// dropped.
pub fn merge_csv<S: AsRef<str>>(parts: &[S]) -> Option<String> {
    let (first, rest) = parts.split_first()?;
    let first = first.as_ref().trim();
    let header = first.lines().next().unwrap_or_default().trim().to_string();

    let mut merged = first.to_string();
    for part in rest {
        let mut lines = part
            .as_ref()
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .peekable();
        if lines.peek().map(|line| line.trim() == header).unwrap_or(false) {
            lines.next();
        }
        for line in lines {
            merged.push('\n');
            merged.push_str(line);
        }
    }

    let trimmed = merged.trim_end().len();
    merged.truncate(trimmed);
    Some(merged)
}
