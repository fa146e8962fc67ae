//! Cache command implementation.

use crate::cli::{CacheAction, CacheArgs};
use crate::commands::open_cache;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute a cache action.
pub fn execute_cache(args: CacheArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    match args.action {
        CacheAction::Stats => {
            let cache = open_cache(config)?;
            let stats = cache.stats()?;
            println!("{}", formatter.format_cache_stats(cache.dir(), &stats)?);
        }
    }
    Ok(())
}
