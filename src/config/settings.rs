use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::vcs::Backend;
use crate::{Error, Result};

/// Settings file name inside the XDG config directory.
pub const SETTINGS_FILENAME: &str = "config.toml";

/// Template written by `plugin-fetcher init`.
pub const SETTINGS_TEMPLATE: &str = r#"# plugin-fetcher settings

# Where fetched plugins are staged, one directory per plugin id
# plugins_dir = "/path/to/project/plugins"

# Reuse checkouts across fetches (defaults to the XDG cache directory)
use_cache = true
# cache_dir = "/path/to/cache"

[vcs]
# "cli" spawns the git executable, "libgit" clones in-process
backend = "cli"
program = "git"
"#;

/// Version-control settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VcsSettings {
    pub backend: Backend,
    pub program: String,
}

impl Default for VcsSettings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            program: "git".to_string(),
        }
    }
}

/// The parsed config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub plugins_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
    pub vcs: VcsSettings,
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plugins_dir: None,
            cache_dir: None,
            use_cache: true,
            vcs: VcsSettings::default(),
            path: None,
        }
    }
}

impl Settings {
    /// Get the global settings path (~/.config/plugin-fetcher/config.toml).
    pub fn global_path() -> Option<PathBuf> {
        let dirs = xdg::BaseDirectories::with_prefix("plugin-fetcher");
        dirs.get_config_home().map(|p| p.join(SETTINGS_FILENAME))
    }

    /// Parse settings from TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::SettingsParse(e.to_string()))
    }

    /// Load settings from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut settings = Self::parse(&content)?;
        settings.path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Load `path` if given, else the global settings if they exist, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::global_path() {
            Some(global) if global.exists() => Self::load(&global),
            _ => Ok(Self::default()),
        }
    }

    /// Write the settings template to `path`, refusing to overwrite.
    pub fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(Error::SettingsExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path, SETTINGS_TEMPLATE).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
