//! Configuration for generation and reconciliation

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How reconciliation calls the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// One call carrying every extracted record
    #[default]
    Batch,
    /// One call per extracted record
    PerRecord,
}

/// Configuration for the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum chunk size (characters); longer text is split
    pub max_chunk_size: usize,

    /// Maximum time for a single model call (seconds)
    pub generation_timeout_secs: u64,

    /// Reference rows embedded in a reconciliation prompt
    pub reference_row_limit: usize,

    /// Extracted records sent for reconciliation
    pub extracted_record_limit: usize,

    /// Reconciliation call pattern
    pub reconcile_mode: ReconcileMode,

    /// Field names for the structured-record contract
    pub record_fields: Vec<String>,
}

impl PipelineConfig {
    /// Get the generation timeout as a Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.generation_timeout_secs == 0 {
            return Err("generation_timeout_secs must be greater than 0".to_string());
        }
        if self.reference_row_limit == 0 {
            return Err("reference_row_limit must be greater than 0".to_string());
        }
        if self.extracted_record_limit == 0 {
            return Err("extracted_record_limit must be greater than 0".to_string());
        }
        if self.record_fields.is_empty() {
            return Err("record_fields must name at least one field".to_string());
        }
        if self.record_fields.iter().any(|f| f.trim().is_empty()) {
            return Err("record_fields cannot contain empty names".to_string());
        }
        Ok(())
    }
}

fn default_record_fields() -> Vec<String> {
    ["chapter", "title", "topic", "description"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

impl Default for PipelineConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_chunk_size: 150_000,
            generation_timeout_secs: 300,
            reference_row_limit: 50,
            extracted_record_limit: 60,
            reconcile_mode: ReconcileMode::Batch,
            record_fields: default_record_fields(),
        }
    }
}

impl PipelineConfig {
    /// Aggressive preset: shorter timeouts, smaller prompts
    pub fn aggressive() -> Self {
        Self {
            max_chunk_size: 60_000,
            generation_timeout_secs: 120,
            reference_row_limit: 30,
            extracted_record_limit: 40,
            reconcile_mode: ReconcileMode::Batch,
            record_fields: default_record_fields(),
        }
    }

    /// Lenient preset: longer timeouts, larger prompts, one match call per record
    pub fn lenient() -> Self {
        Self {
            max_chunk_size: 180_000,
            generation_timeout_secs: 600,
            reference_row_limit: 100,
            extracted_record_limit: 120,
            reconcile_mode: ReconcileMode::PerRecord,
            record_fields: default_record_fields(),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
