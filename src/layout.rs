use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Name of the manifest every fetched plugin carries at its root.
pub const PLUGIN_XML: &str = "plugin.xml";

/// Encapsulates where a plugin lives inside a cloned or cached checkout.
///
/// Provides lazy-cached path accessors:
/// - `<work_dir>/<subdir>` - effective source directory
/// - `<work_dir>/<subdir>/plugin.xml` - plugin manifest
#[derive(Debug)]
pub struct PluginLayout {
    work_dir: PathBuf,
    subdir: Option<PathBuf>,
    source_dir: OnceCell<PathBuf>,
    plugin_xml: OnceCell<PathBuf>,
}

impl Clone for PluginLayout {
    fn clone(&self) -> Self {
        // Fresh cells; paths are recomputed lazily
        Self {
            work_dir: self.work_dir.clone(),
            subdir: self.subdir.clone(),
            source_dir: OnceCell::new(),
            plugin_xml: OnceCell::new(),
        }
    }
}

impl PluginLayout {
    /// Create a layout for a checkout at `work_dir`, optionally scoped to `subdir`.
    ///
    /// An empty subdirectory is the same as none.
    pub fn new(work_dir: impl Into<PathBuf>, subdir: Option<&str>) -> Self {
        Self {
            work_dir: work_dir.into(),
            subdir: subdir.filter(|s| !s.is_empty()).map(PathBuf::from),
            source_dir: OnceCell::new(),
            plugin_xml: OnceCell::new(),
        }
    }

    /// Returns reference to the checkout root.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Returns the directory holding the plugin's files.
    pub fn source_dir(&self) -> &Path {
        self.source_dir.get_or_init(|| match &self.subdir {
            Some(subdir) => self.work_dir.join(subdir),
            None => self.work_dir.clone(),
        })
    }

    /// Returns the path of the plugin manifest.
    pub fn plugin_xml(&self) -> &Path {
        self.plugin_xml
            .get_or_init(|| self.source_dir().join(PLUGIN_XML))
    }
}
