//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::pdf_extractor;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let extractor = pdf_extractor(config)?;
    let text = extractor.extract_file(&args.pdf)?;

    if args.print {
        println!("{}", text.text);
    } else {
        println!("{}", formatter.format_extraction(&args.pdf, &text)?);
    }
    Ok(())
}
