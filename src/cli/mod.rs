mod cache;
mod fetch;
mod init;
mod list;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::fetcher::CacheManager;
use crate::vcs::Backend;
use crate::{Error, Result};

#[derive(Parser)]
#[command(name = "plugin-fetcher")]
#[command(about = "Fetch plugins from git repositories into a plugins directory")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to ~/.config/plugin-fetcher/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a settings file with the defaults
    Init {
        /// Write here instead of the global settings path
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Fetch a plugin from a git repository
    Fetch {
        /// Repository URL
        url: String,

        /// Directory inside the repository containing plugin.xml
        #[arg(long)]
        subdir: Option<String>,

        /// Branch, tag or commit to check out
        #[arg(long = "ref")]
        reference: Option<String>,

        /// Where to stage the plugin
        #[arg(long)]
        plugins_dir: Option<PathBuf>,

        /// Cache checkouts here
        #[arg(long, conflicts_with = "no_cache")]
        cache_dir: Option<PathBuf>,

        /// Always clone into a scratch directory
        #[arg(long)]
        no_cache: bool,

        /// Version-control backend
        #[arg(long, value_enum)]
        backend: Option<Backend>,
    },

    /// List fetched plugins
    List {
        /// Plugins directory to list
        #[arg(long)]
        plugins_dir: Option<PathBuf>,

        /// Show id and version from each plugin.xml
        #[arg(long)]
        long: bool,

        /// Print JSON
        #[arg(long, conflicts_with = "long")]
        json: bool,
    },

    /// Inspect or clear the checkout cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Print the cache entry name for a repository
    Key {
        /// Repository URL
        url: String,

        /// Branch, tag or commit
        #[arg(long = "ref")]
        reference: Option<String>,

        /// Directory inside the repository
        #[arg(long)]
        subdir: Option<String>,
    },

    /// Print the cache directory
    Dir,

    /// Remove every cached checkout
    Clean,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = self.config;
        let settings = || Settings::load_or_default(config.as_deref());

        match self.command {
            Commands::Init { path } => init::run(path.or_else(|| config.clone())),
            Commands::Fetch {
                url,
                subdir,
                reference,
                plugins_dir,
                cache_dir,
                no_cache,
                backend,
            } => fetch::run(
                &settings()?,
                fetch::Args {
                    url,
                    subdir,
                    reference,
                    plugins_dir,
                    cache_dir,
                    no_cache,
                    backend,
                },
            ),
            Commands::List {
                plugins_dir,
                long,
                json,
            } => list::run(&settings()?, plugins_dir, long, json),
            Commands::Cache { command } => cache::run(&settings()?, command),
        }
    }
}

/// The plugins directory from the command line, falling back to settings.
fn plugins_dir(settings: &Settings, flag: Option<PathBuf>) -> Result<PathBuf> {
    flag.or_else(|| settings.plugins_dir.clone()).ok_or_else(|| {
        let location = settings
            .path
            .clone()
            .or_else(Settings::global_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "config.toml".to_string());
        Error::NoPluginsDir(location)
    })
}

/// The cache root from the command line, then settings, then the XDG cache directory.
fn cache_root(settings: &Settings, flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag.or_else(|| settings.cache_dir.clone()) {
        Some(dir) => Ok(dir),
        None => Ok(CacheManager::new()?.cache_dir().to_path_buf()),
    }
}
