//! Writing artifacts and reconciliations to the output directory
//!
//! File names are derived from the source document and the instruction;
//! repeating the same instruction overwrites the earlier file.

use crate::error::ExtractorError;
use crate::types::Reconciliation;
use folio_domain::GeneratedArtifact;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Characters of the sanitized instruction kept in a file name
pub const INSTRUCTION_PREFIX_LEN: usize = 30;

/// Lines shown by [`preview`]
pub const PREVIEW_LINES: usize = 10;

fn unsafe_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid regex"))
}

/// Make an instruction safe for use in a file name
///
/// Drops everything except word characters, whitespace and hyphens, then
/// trims, lowercases, replaces whitespace with underscores and keeps the
/// first [`INSTRUCTION_PREFIX_LEN`] characters.
///
/// # Examples
///
/// ```
/// use folio_extractor::export::sanitize_instruction;
///
/// assert_eq!(sanitize_instruction("List all dates!"), "list_all_dates");
/// ```
pub fn sanitize_instruction(instruction: &str) -> String {
    let cleaned = unsafe_chars_re().replace_all(instruction, "");
    cleaned
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(INSTRUCTION_PREFIX_LEN)
        .collect()
}

/// Stem of the source document, or `document` when it has none
fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// `{source_stem}_{sanitized_instruction}.{csv|json}`
pub fn artifact_file_name(source: &Path, instruction: &str, artifact: &GeneratedArtifact) -> String {
    let ext = match artifact {
        GeneratedArtifact::Csv(_) => "csv",
        GeneratedArtifact::Records(_) => "json",
    };
    format!("{}_{}.{}", source_stem(source), sanitize_instruction(instruction), ext)
}

/// Serialized file contents of an artifact
pub fn render_artifact(artifact: &GeneratedArtifact) -> Result<String, ExtractorError> {
    match artifact {
        GeneratedArtifact::Csv(csv) => Ok(csv.clone()),
        GeneratedArtifact::Records(records) => serde_json::to_string_pretty(records)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize records: {}", e))),
    }
}

/// First [`PREVIEW_LINES`] lines of the rendered artifact
pub fn preview(artifact: &GeneratedArtifact) -> String {
    let rendered = render_artifact(artifact).unwrap_or_default();
    rendered
        .lines()
        .take(PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

fn write(path: &Path, contents: &str) -> Result<(), ExtractorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ExtractorError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| ExtractorError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Save an artifact under `output_dir`, returning the written path
pub fn save_artifact(
    output_dir: &Path,
    source: &Path,
    instruction: &str,
    artifact: &GeneratedArtifact,
) -> Result<PathBuf, ExtractorError> {
    let path = output_dir.join(artifact_file_name(source, instruction, artifact));
    write(&path, &render_artifact(artifact)?)?;
    info!("Saved {} rows to {}", artifact.row_count(), path.display());
    Ok(path)
}

/// Save a reconciliation as `{source_stem}_mapped.json`
pub fn save_reconciliation(
    output_dir: &Path,
    source: &Path,
    reconciliation: &Reconciliation,
) -> Result<PathBuf, ExtractorError> {
    let path = output_dir.join(format!("{}_mapped.json", source_stem(source)));
    let json = serde_json::to_string_pretty(reconciliation)
        .map_err(|e| ExtractorError::Config(format!("Failed to serialize matches: {}", e)))?;
    write(&path, &json)?;
    info!("Saved {} matches to {}", reconciliation.matches.len(), path.display());
    Ok(path)
}
