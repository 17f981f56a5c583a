use std::path::PathBuf;
use tracing::debug;

use crate::Result;
use crate::config::Settings;
use crate::fetcher::{FetchRequest, RepoFetcher};
use crate::vcs::Backend;

/// Command-line arguments of `fetch`.
pub struct Args {
    pub url: String,
    pub subdir: Option<String>,
    pub reference: Option<String>,
    pub plugins_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub no_cache: bool,
    pub backend: Option<Backend>,
}

/// Build the fetch request from arguments and settings.
fn request(settings: &Settings, args: Args) -> Result<FetchRequest> {
    let mut request = FetchRequest::new(args.url, super::plugins_dir(settings, args.plugins_dir)?);
    request.reference = args.reference;
    request.subdir = args.subdir;

    // An explicit --cache-dir wins over use_cache = false
    if args.cache_dir.is_some() || (settings.use_cache && !args.no_cache) {
        request.cache_dir = Some(super::cache_root(settings, args.cache_dir)?);
    }
    Ok(request)
}

/// Fetch one plugin into the plugins directory.
pub fn run(settings: &Settings, args: Args) -> Result<()> {
    let backend = args.backend.unwrap_or(settings.vcs.backend);
    let request = request(settings, args)?;
    debug!(?request, ?backend, "fetch request");

    let fetcher = RepoFetcher::new(backend.build(&settings.vcs.program));
    let plugin_dir = fetcher.fetch(&request)?;

    println!("Fetched {} into {}", request.url, plugin_dir.display());
    Ok(())
}
