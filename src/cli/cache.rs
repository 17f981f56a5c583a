use crate::Result;
use crate::config::Settings;
use crate::fetcher::{CacheManager, cache_key};

use super::CacheCommands;

/// Inspect or clear the checkout cache.
pub fn run(settings: &Settings, command: CacheCommands) -> Result<()> {
    match command {
        CacheCommands::Key {
            url,
            reference,
            subdir,
        } => {
            println!("{}", cache_key(&url, reference.as_deref(), subdir.as_deref()));
        }
        CacheCommands::Dir => {
            println!("{}", super::cache_root(settings, None)?.display());
        }
        CacheCommands::Clean => {
            let cache = CacheManager::with_cache_dir(super::cache_root(settings, None)?);
            let removed = cache.clear()?;
            println!(
                "Removed {} cached checkout(s) from {}",
                removed,
                cache.cache_dir().display()
            );
        }
    }
    Ok(())
}
