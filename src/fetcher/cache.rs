use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::layout::PluginLayout;
use crate::{Error, Result};

/// CACHEDIR.TAG content per https://bford.info/cachedir/
const CACHEDIR_TAG_CONTENT: &str = "Signature: 8a477f597d28d172789f06886806bc55\n\
# This file is a cache directory tag created by plugin-fetcher.\n\
# For information about cache directory tags, see:\n\
#   https://bford.info/cachedir/\n";

const CACHEDIR_TAG: &str = "CACHEDIR.TAG";

/// Name of the cache entry for a repository at a revision, scoped to a subdirectory.
///
/// Hashes `url#reference:subdir`; the `:subdir` part is left out when there is no
/// subdirectory and a missing reference hashes as empty.
pub fn cache_key(url: &str, reference: Option<&str>, subdir: Option<&str>) -> String {
    let mut key = format!("{url}#{}", reference.unwrap_or_default());
    if let Some(subdir) = subdir.filter(|s| !s.is_empty()) {
        key.push(':');
        key.push_str(subdir);
    }
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Cache of fetched checkouts, one directory per [`cache_key`].
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Create a new cache manager using XDG cache directory.
    pub fn new() -> Result<Self> {
        let dirs = xdg::BaseDirectories::with_prefix("plugin-fetcher");
        let cache_dir = dirs.get_cache_home().ok_or_else(|| {
            Error::CacheCreate(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine cache directory",
            ))
        })?;

        Ok(Self { cache_dir })
    }

    /// Create a cache manager rooted at `cache_dir`.
    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Get the cache directory path.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Ensure the cache directory exists and has a CACHEDIR.TAG.
    pub fn ensure_cache_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir).map_err(Error::CacheCreate)?;

        let tag_path = self.cache_dir.join(CACHEDIR_TAG);
        if !tag_path.exists() {
            std::fs::write(&tag_path, CACHEDIR_TAG_CONTENT).map_err(Error::CacheCreate)?;
        }

        Ok(())
    }

    /// Directory a checkout of `url` at `reference` is cloned into.
    pub fn entry_path(&self, url: &str, reference: Option<&str>, subdir: Option<&str>) -> PathBuf {
        self.cache_dir.join(cache_key(url, reference, subdir))
    }

    /// Layout of the cached checkout for `url` at `reference`.
    pub fn entry_layout(&self, url: &str, reference: Option<&str>, subdir: Option<&str>) -> PluginLayout {
        PluginLayout::new(self.entry_path(url, reference, subdir), subdir)
    }

    /// Check if a usable checkout is cached: its plugin.xml must be present.
    pub fn is_cached(&self, url: &str, reference: Option<&str>, subdir: Option<&str>) -> bool {
        self.entry_layout(url, reference, subdir).plugin_xml().exists()
    }

    /// Remove every cache entry, keeping the cache root and its tag.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize> {
        if !self.cache_dir.exists() {
            return Ok(0);
        }

        let read_err = |e| Error::FileRead {
            path: self.cache_dir.clone(),
            source: e,
        };

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.cache_dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if entry.file_name() == CACHEDIR_TAG {
                continue;
            }
            let path = entry.path();
            let result = if entry.file_type().map_err(read_err)?.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            result.map_err(|e| Error::FileWrite { path, source: e })?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// Recursively copy a directory, excluding .git.
///
/// Symlinks are recreated as links rather than followed.
pub(crate) fn copy_dir_recursive_exclude_git(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let name = entry.file_name();
        let src_path = entry.path();
        let dst_path = dst.join(&name);

        // Skip .git directory
        if name == ".git" {
            continue;
        }

        if ty.is_symlink() {
            copy_symlink(&src_path, &dst_path)?;
        } else if ty.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive_exclude_git(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(std::fs::read_link(src)?, dst)
}

#[cfg(windows)]
fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    let target = std::fs::read_link(src)?;
    // Windows needs to know the kind of the link target; dangling links become file links
    if std::fs::metadata(src).is_ok_and(|m| m.is_dir()) {
        std::os::windows::fs::symlink_dir(target, dst)
    } else {
        std::os::windows::fs::symlink_file(target, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    if std::fs::metadata(src)?.is_dir() {
        std::fs::create_dir_all(dst)?;
        copy_dir_recursive_exclude_git(src, dst)
    } else {
        std::fs::copy(src, dst).map(|_| ())
    }
}
