//! Run command implementation: extract, generate and save.

use crate::cli::RunArgs;
use crate::commands::generate::{generate, usable_text};
use crate::commands::{extract_pdf, format_contract, save_checked};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use folio_domain::traits::LlmProvider;
use folio_domain::GenerationRequest;
use std::fmt::Display;
use std::sync::Arc;
use tracing::info;

/// Execute the run command.
pub async fn execute_run<L>(
    args: RunArgs,
    config: &Config,
    provider: Arc<L>,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    info!("Extracting text from {}", args.pdf.display());
    let text = extract_pdf(config, &args.pdf).await?;
    let payload = usable_text(&args.pdf, text)?;

    let contract = format_contract(args.records, &args.fields, config);
    let request = GenerationRequest::new(payload, args.instruction.as_str(), contract);
    let outcome = generate(config, provider, &request).await?;

    let saved = save_checked(config, &args.pdf, &args.instruction, &outcome.artifact)?;
    println!("{}", formatter.format_outcome(&outcome, Some(&saved))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::CliError;
    use folio_llm::MockProvider;
    use folio_pdf::PdfError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_missing_pdf() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            cache_dir: dir.path().join("cache"),
            output_dir: dir.path().join("output"),
            ..Default::default()
        };
        let llm = MockProvider::new("a\n1");
        let args = RunArgs {
            pdf: dir.path().join("missing.pdf"),
            instruction: "dates".to_string(),
            records: false,
            fields: vec![],
        };

        let result = execute_run(args, &config, Arc::new(llm.clone()), &Formatter::new(OutputFormat::Table, false)).await;

        assert!(matches!(result, Err(CliError::Pdf(PdfError::InputNotFound(_)))));
        assert_eq!(llm.call_count(), 0);
    }
}
