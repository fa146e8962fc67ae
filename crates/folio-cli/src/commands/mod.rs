//! Command implementations.

pub mod cache;
pub mod extract;
pub mod generate;
pub mod reconcile;
pub mod run;

pub use self::cache::execute_cache;
pub use self::extract::execute_extract;
pub use self::generate::execute_generate;
pub use self::reconcile::execute_reconcile;
pub use self::run::execute_run;

use crate::config::Config;
use crate::error::{CliError, Result};
use folio_domain::{ExtractedText, FormatContract, GeneratedArtifact};
use folio_extractor::export::save_artifact;
use folio_pdf::{LopdfTextLayer, TesseractOcr, TextExtractor};
use folio_store::FsCache;
use std::path::{Path, PathBuf};

/// Extractor wired to the configured cache, gate and OCR tools.
pub(crate) type PdfExtractor = TextExtractor<LopdfTextLayer, TesseractOcr, FsCache>;

pub(crate) fn open_cache(config: &Config) -> Result<FsCache> {
    Ok(FsCache::open(&config.cache_dir)?)
}

pub(crate) fn pdf_extractor(config: &Config) -> Result<PdfExtractor> {
    Ok(TextExtractor::new(
        LopdfTextLayer::new(),
        TesseractOcr::with_config(config.ocr.clone()),
        open_cache(config)?,
    )
    .with_quality_gate(config.quality))
}

/// Extract a PDF on the blocking pool.
pub(crate) async fn extract_pdf(config: &Config, path: &Path) -> Result<ExtractedText> {
    let extractor = pdf_extractor(config)?;
    let path = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || extractor.extract_file(&path))
        .await
        .map_err(|e| CliError::Task(e.to_string()))??;
    Ok(text)
}

pub(crate) fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Contract for `--records` / `--fields`.
pub(crate) fn format_contract(records: bool, fields: &[String], config: &Config) -> FormatContract {
    match (records, fields.is_empty()) {
        (false, _) => FormatContract::Csv,
        (true, true) => FormatContract::records(config.pipeline.record_fields.iter().cloned()),
        (true, false) => FormatContract::records(fields.iter().cloned()),
    }
}

/// Save an artifact, refusing one with no data rows.
pub(crate) fn save_checked(
    config: &Config,
    source: &Path,
    instruction: &str,
    artifact: &GeneratedArtifact,
) -> Result<PathBuf> {
    if artifact.row_count() == 0 {
        return Err(CliError::NoData);
    }
    Ok(save_artifact(&config.output_dir, source, instruction, artifact)?)
}
