//! Reconcile command implementation.

use crate::cli::ReconcileArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use folio_domain::traits::{LlmProvider, TableSource};
use folio_extractor::export::save_reconciliation;
use folio_extractor::normalizer::normalize_records;
use folio_extractor::{CsvTableSource, GenerationClient, Reconciler};
use std::fmt::Display;
use std::sync::Arc;

/// Execute the reconcile command.
pub async fn execute_reconcile<L>(
    args: ReconcileArgs,
    config: &Config,
    provider: Arc<L>,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let contents = std::fs::read_to_string(&args.records).map_err(|e| {
        CliError::InvalidInput(format!("Cannot read {}: {}", args.records.display(), e))
    })?;
    let records = normalize_records(&contents).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "{} is not a JSON array of records",
            args.records.display()
        ))
    })?;

    let reference = CsvTableSource::new(&args.reference).load()?;

    let mut pipeline = config.pipeline.clone();
    if let Some(mode) = args.mode {
        pipeline.reconcile_mode = mode.into();
    }
    let client = GenerationClient::from_shared(provider, pipeline.generation_timeout());
    let reconciler = Reconciler::with_client(client, pipeline);
    let result = reconciler.reconcile(&records, &reference).await?;

    let saved = if args.no_save {
        None
    } else {
        Some(save_reconciliation(&config.output_dir, &args.records, &result)?)
    };

    println!("{}", formatter.format_reconciliation(&result, saved.as_deref())?);
    Ok(())
}
