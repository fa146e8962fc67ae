//! Folio CLI - turn PDFs into structured data with a language model.

use clap::Parser;
use folio_cli::commands;
use folio_cli::{build_provider, Cli, Command, Config, Formatter};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> folio_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter),
        Command::Cache(args) => commands::execute_cache(args, &config, &formatter),
        cmd => {
            // The provider owns a blocking HTTP client; create and drop it
            // outside the runtime
            let provider = Arc::new(build_provider(
                &config.provider,
                config.pipeline.generation_timeout(),
            )?);
            let runtime = tokio::runtime::Runtime::new()?;

            let result = runtime.block_on(async {
                match cmd {
                    Command::Generate(args) => {
                        commands::execute_generate(args, &config, provider.clone(), &formatter).await
                    }
                    Command::Run(args) => {
                        commands::execute_run(args, &config, provider.clone(), &formatter).await
                    }
                    Command::Reconcile(args) => {
                        commands::execute_reconcile(args, &config, provider.clone(), &formatter).await
                    }
                    _ => unreachable!(),
                }
            });

            drop(runtime);
            drop(provider);
            result
        }
    }
}
