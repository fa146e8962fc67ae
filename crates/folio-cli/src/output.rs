//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use folio_domain::{EntryKind, ExtractedText, FallbackReason, GeneratedArtifact, TextOrigin};
use folio_extractor::export::preview;
use folio_extractor::{GenerationOutcome, Reconciliation};
use folio_store::CacheStats;
use colored::*;
use serde_json::json;
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const RATIONALE_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Summarize an extraction.
    pub fn format_extraction(&self, source: &Path, text: &ExtractedText) -> Result<String> {
        let pages = text.pages();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "source": source.display().to_string(),
                "fingerprint": text.fingerprint.as_str(),
                "origin": text.origin,
                "pages": pages.len(),
                "ocr_pages": pages.iter().filter(|p| p.ocr).count(),
                "characters": text.text.chars().count(),
                "ocr_failed": text.ocr_failed(),
            }))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                builder.push_record(["Source".to_string(), source.display().to_string()]);
                builder.push_record(["Fingerprint".to_string(), text.fingerprint.short().to_string()]);
                builder.push_record(["Origin".to_string(), describe_origin(&text.origin)]);
                builder.push_record(["Pages".to_string(), pages.len().to_string()]);
                builder.push_record(["Characters".to_string(), text.text.chars().count().to_string()]);
                let mut out = self.table(builder);
                if text.ocr_failed() {
                    out.push('\n');
                    out.push_str(&self.warning("OCR failed; the cached text is only a failure marker"));
                }
                Ok(out)
            }
        }
    }

    /// Summarize a generation job with a preview of the artifact.
    pub fn format_outcome(&self, outcome: &GenerationOutcome, saved_to: Option<&Path>) -> Result<String> {
        let meta = &outcome.metadata;
        match self.format {
            OutputFormat::Json => {
                let artifact = match &outcome.artifact {
                    GeneratedArtifact::Csv(csv) => json!(csv),
                    GeneratedArtifact::Records(records) => json!(records),
                };
                let failures: Vec<_> = meta
                    .failures
                    .iter()
                    .map(|f| json!({ "chunk_index": f.chunk_index, "reason": f.reason }))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "fingerprint": meta.fingerprint.as_str(),
                    "model": meta.model_name,
                    "from_cache": meta.from_cache,
                    "chunks": meta.chunk_count,
                    "failures": failures,
                    "processing_time_ms": meta.processing_time_ms,
                    "rows": outcome.artifact.row_count(),
                    "saved_to": saved_to.map(|p| p.display().to_string()),
                    "artifact": artifact,
                }))?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                builder.push_record(["Model".to_string(), meta.model_name.clone()]);
                builder.push_record(["From cache".to_string(), meta.from_cache.to_string()]);
                builder.push_record(["Chunks".to_string(), meta.chunk_count.to_string()]);
                builder.push_record(["Failed chunks".to_string(), meta.failures.len().to_string()]);
                builder.push_record(["Rows".to_string(), outcome.artifact.row_count().to_string()]);
                builder.push_record(["Time".to_string(), format!("{} ms", meta.processing_time_ms)]);

                let mut out = self.table(builder);
                for failure in &meta.failures {
                    out.push('\n');
                    out.push_str(&self.warning(&format!(
                        "Chunk {} discarded: {}",
                        failure.chunk_index + 1,
                        failure.reason
                    )));
                }
                if let Some(path) = saved_to {
                    out.push('\n');
                    out.push_str(&self.success(&format!("Saved to {}", path.display())));
                }
                out.push_str("\n\n");
                out.push_str(&self.colorize("Preview:", "cyan"));
                out.push('\n');
                out.push_str(&preview(&outcome.artifact));
                Ok(out)
            }
        }
    }

    /// Format reconciliation results.
    pub fn format_reconciliation(&self, result: &Reconciliation, saved_to: Option<&Path>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Table => {
                if result.matches.is_empty() {
                    return Ok(self.colorize("No records to match.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Record", "Matched ID", "Confidence", "Rationale"]);
                for (idx, m) in result.matches.iter().enumerate() {
                    let label = m
                        .record
                        .get("title")
                        .or_else(|| m.record.values().next())
                        .cloned()
                        .unwrap_or_default();
                    builder.push_record([
                        (idx + 1).to_string(),
                        label,
                        m.matched_id.clone().unwrap_or_else(|| "-".to_string()),
                        m.confidence.to_string(),
                        truncate(&m.rationale, RATIONALE_WIDTH),
                    ]);
                }

                let mut out = self.table(builder);
                out.push('\n');
                out.push_str(&self.info(&format!(
                    "{}/{} records matched (identifier column '{}')",
                    result.matched_count(),
                    result.matches.len(),
                    result.identifier_column
                )));
                if !result.discarded_ids.is_empty() {
                    out.push('\n');
                    out.push_str(&self.warning(&format!(
                        "Discarded identifiers not in the reference set: {}",
                        result.discarded_ids.join(", ")
                    )));
                }
                if let Some(summary) = &result.summary {
                    out.push_str("\n\n");
                    out.push_str(&self.colorize("Summary:", "cyan"));
                    out.push(' ');
                    out.push_str(summary);
                }
                if let Some(path) = saved_to {
                    out.push('\n');
                    out.push_str(&self.success(&format!("Saved to {}", path.display())));
                }
                Ok(out)
            }
        }
    }

    /// Format cache statistics.
    pub fn format_cache_stats(&self, dir: &Path, stats: &CacheStats) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "dir": dir.display().to_string(),
                "text": stats.count(EntryKind::Text),
                "csv": stats.count(EntryKind::Csv),
                "json": stats.count(EntryKind::Json),
                "total_bytes": stats.total_bytes,
            }))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Kind", "Entries"]);
                for (label, kind) in [
                    ("Extracted text", EntryKind::Text),
                    ("CSV artifacts", EntryKind::Csv),
                    ("Record artifacts", EntryKind::Json),
                ] {
                    builder.push_record([label.to_string(), stats.count(kind).to_string()]);
                }
                let mut out = self.table(builder);
                out.push('\n');
                out.push_str(&self.info(&format!("{} bytes in {}", stats.total_bytes, dir.display())));
                Ok(out)
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Human description of where extracted text came from.
pub fn describe_origin(origin: &TextOrigin) -> String {
    let reason = |r: &FallbackReason| match r {
        FallbackReason::TextLayerError(e) => format!("text layer unreadable: {}", e),
        FallbackReason::LowQuality => "text layer too short or noisy".to_string(),
    };
    match origin {
        TextOrigin::Cache => "cache".to_string(),
        TextOrigin::TextLayer => "text layer".to_string(),
        TextOrigin::Ocr { reason: r } => format!("OCR ({})", reason(r)),
        TextOrigin::OcrFailed { reason: r } => format!("OCR failed ({})", reason(r)),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
