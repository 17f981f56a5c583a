use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

use crate::layout::PLUGIN_XML;
use crate::{Error, Result};

/// Directory names left behind by other version-control systems.
const IGNORED_DIRS: &[&str] = &[".svn", "CVS"];

/// Identity read from a plugin's `plugin.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginXml {
    pub id: String,
    pub version: Option<String>,
    pub name: Option<String>,
}

impl PluginXml {
    /// Parse manifest content; `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let doc = roxmltree::Document::parse(content).map_err(|e| Error::PluginXmlParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let root = doc.root_element();

        let id = root
            .attribute("id")
            .ok_or_else(|| Error::PluginIdMissing(path.to_path_buf()))?
            .to_string();
        let version = root.attribute("version").map(str::to_string);
        let name = root
            .children()
            .find(|n| n.has_tag_name("name"))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self { id, version, name })
    }

    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }
}

/// List the plugin directories in `plugins_dir`, ignoring files, `.svn` and `CVS`.
///
/// A missing directory has no plugins. Order follows the directory listing.
#[instrument]
pub fn list_plugins(plugins_dir: &Path) -> Result<Vec<String>> {
    if !plugins_dir.exists() {
        debug!("plugins directory does not exist");
        return Ok(Vec::new());
    }

    let read_err = |e| Error::FileRead {
        path: plugins_dir.to_path_buf(),
        source: e,
    };

    let mut plugins = Vec::new();
    for entry in std::fs::read_dir(plugins_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if IGNORED_DIRS.contains(&name.as_str()) {
            trace!(%name, "skipping version-control directory");
            continue;
        }

        // Follow symlinks so linked plugin checkouts are listed too
        let metadata = std::fs::metadata(entry.path()).map_err(|e| Error::FileRead {
            path: entry.path(),
            source: e,
        })?;
        if metadata.is_dir() {
            plugins.push(name);
        }
    }

    debug!(count = plugins.len(), "plugins listed");
    Ok(plugins)
}

/// A staged plugin directory together with whatever its manifest says.
#[derive(Debug, Clone, Serialize)]
pub struct InstalledPlugin {
    pub dir: String,
    pub path: PathBuf,
    pub id: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
}

/// Describe every plugin in `plugins_dir`, sorted by directory name.
///
/// Directories without a readable manifest are still reported, with no identity.
pub fn describe_plugins(plugins_dir: &Path) -> Result<Vec<InstalledPlugin>> {
    let mut dirs = list_plugins(plugins_dir)?;
    dirs.sort();

    Ok(dirs
        .into_iter()
        .map(|dir| {
            let path = plugins_dir.join(&dir);
            let manifest = match PluginXml::load(&path.join(PLUGIN_XML)) {
                Ok(m) => Some(m),
                Err(e) => {
                    debug!(dir = %dir, error = %e, "no usable plugin.xml");
                    None
                }
            };
            InstalledPlugin {
                dir,
                path,
                id: manifest.as_ref().map(|m| m.id.clone()),
                version: manifest.as_ref().and_then(|m| m.version.clone()),
                name: manifest.and_then(|m| m.name),
            }
        })
        .collect())
}
