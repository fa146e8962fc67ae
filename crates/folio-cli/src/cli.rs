//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use folio_extractor::ReconcileMode;
use std::path::PathBuf;

/// Folio - turn PDFs into structured data with a language model.
#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract page-tagged text from a PDF
    Extract(ExtractArgs),

    /// Generate a CSV or record artifact from a PDF or text file
    Generate(GenerateArgs),

    /// Extract, generate and save in one step
    Run(RunArgs),

    /// Match extracted records against a reference CSV
    Reconcile(ReconcileArgs),

    /// Inspect the result cache
    Cache(CacheArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// PDF file
    pub pdf: PathBuf,

    /// Print the extracted text instead of a summary
    #[arg(long)]
    pub print: bool,
}

/// Arguments for the generate command.
#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// PDF, or a text file produced by `extract --print`
    pub input: PathBuf,

    /// What to extract, in plain language
    #[arg(short, long)]
    pub instruction: String,

    /// Produce structured records instead of CSV
    #[arg(short, long)]
    pub records: bool,

    /// Record fields (comma separated); defaults to pipeline.record_fields
    #[arg(long, value_delimiter = ',', requires = "records")]
    pub fields: Vec<String>,

    /// Save the artifact to the output directory
    #[arg(short, long)]
    pub save: bool,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// PDF file
    pub pdf: PathBuf,

    /// What to extract, in plain language
    #[arg(short, long)]
    pub instruction: String,

    /// Produce structured records instead of CSV
    #[arg(short, long)]
    pub records: bool,

    /// Record fields (comma separated); defaults to pipeline.record_fields
    #[arg(long, value_delimiter = ',', requires = "records")]
    pub fields: Vec<String>,
}

/// Arguments for the reconcile command.
#[derive(Debug, Parser)]
pub struct ReconcileArgs {
    /// JSON file with extracted records
    #[arg(long)]
    pub records: PathBuf,

    /// Reference CSV with an identifier column
    #[arg(long)]
    pub reference: PathBuf,

    /// Override pipeline.reconcile_mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Print only; do not write `{name}_mapped.json`
    #[arg(long)]
    pub no_save: bool,
}

/// Arguments for cache management.
#[derive(Debug, Parser)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache actions.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Count cached entries per kind
    Stats,
}

/// Reconciliation mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// One model call for all records
    Batch,
    /// One model call per record
    PerRecord,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ModeArg> for ReconcileMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Batch => ReconcileMode::Batch,
            ModeArg::PerRecord => ReconcileMode::PerRecord,
        }
    }
}
