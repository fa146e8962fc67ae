//! Generate command implementation.

use crate::cli::GenerateArgs;
use crate::commands::{extract_pdf, format_contract, is_pdf, open_cache, save_checked};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use folio_domain::traits::LlmProvider;
use folio_domain::{ExtractedText, GenerationRequest};
use folio_extractor::{ArtifactGenerator, GenerationClient, GenerationOutcome};
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Execute the generate command.
pub async fn execute_generate<L>(
    args: GenerateArgs,
    config: &Config,
    provider: Arc<L>,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let payload = if is_pdf(&args.input) {
        usable_text(&args.input, extract_pdf(config, &args.input).await?)?
    } else {
        std::fs::read_to_string(&args.input).map_err(|e| {
            CliError::InvalidInput(format!("Cannot read {}: {}", args.input.display(), e))
        })?
    };

    let contract = format_contract(args.records, &args.fields, config);
    let request = GenerationRequest::new(payload, args.instruction.as_str(), contract);
    let outcome = generate(config, provider, &request).await?;

    let saved = if args.save {
        Some(save_checked(config, &args.input, &args.instruction, &outcome.artifact)?)
    } else {
        None
    };

    println!("{}", formatter.format_outcome(&outcome, saved.as_deref())?);
    Ok(())
}

/// Run one generation job against the configured cache.
pub(crate) async fn generate<L>(
    config: &Config,
    provider: Arc<L>,
    request: &GenerationRequest,
) -> Result<GenerationOutcome>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let client = GenerationClient::from_shared(provider, config.pipeline.generation_timeout());
    let generator = ArtifactGenerator::with_client(client, open_cache(config)?, config.pipeline.clone());
    let outcome = generator.generate(request).await?;
    info!(
        "Generated {} rows ({})",
        outcome.artifact.row_count(),
        if outcome.metadata.from_cache { "cached" } else { "fresh" }
    );
    Ok(outcome)
}

/// Reject text that is only an OCR failure marker.
pub(crate) fn usable_text(source: &Path, text: ExtractedText) -> Result<String> {
    if text.ocr_failed() {
        let marker = text.text.lines().next().unwrap_or_default().to_string();
        return Err(CliError::InvalidInput(format!(
            "No text could be extracted from {}: {}",
            source.display(),
            marker
        )));
    }
    Ok(text.text)
}
