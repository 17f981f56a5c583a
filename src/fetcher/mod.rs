//! Fetching plugin sources into a plugins directory.
//!
//! A fetch clones the repository (or reuses a cached checkout), optionally checks
//! out a revision, reads the plugin id from `plugin.xml` and copies the plugin's
//! files to `<plugins_dir>/<id>`.
//!
//! Concurrent fetches of the same repository, revision and subdirectory into one
//! cache directory are not coordinated and race on the same cache entry.

mod cache;
mod progress;

pub use cache::{CacheManager, cache_key};
pub use progress::{Level, Progress, TracingProgress};

#[cfg(test)]
use progress::RecordingProgress;

use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

use crate::layout::PluginLayout;
use crate::plugins::PluginXml;
use crate::vcs::{ExecContext, Vcs};
use crate::{Error, Result};

/// Prefix of the scratch directories used when no cache is configured.
const SCRATCH_PREFIX: &str = "plugin-fetch-";

/// Everything needed to fetch one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Repository to clone.
    pub url: String,
    /// Branch, tag or commit to check out after cloning.
    pub reference: Option<String>,
    /// Directory inside the repository that holds `plugin.xml`.
    pub subdir: Option<String>,
    /// Where the plugin is staged, under its id.
    pub plugins_dir: PathBuf,
    /// Keep checkouts here and reuse them on later fetches.
    pub cache_dir: Option<PathBuf>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            reference: None,
            subdir: None,
            plugins_dir: plugins_dir.into(),
            cache_dir: None,
        }
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    fn subdir_str(&self) -> Option<&str> {
        self.subdir.as_deref().filter(|s| !s.is_empty())
    }

    /// `url#ref`, the way progress messages name the source.
    fn source_label(&self) -> String {
        format!("{}#{}", self.url, self.reference.as_deref().unwrap_or_default())
    }
}

/// Fetches plugins through a version-control backend, reporting to a progress sink.
pub struct RepoFetcher<V, P = TracingProgress> {
    vcs: V,
    progress: P,
}

impl<V: Vcs> RepoFetcher<V, TracingProgress> {
    /// Create a fetcher that reports progress through `tracing`.
    pub fn new(vcs: V) -> Self {
        Self::with_progress(vcs, TracingProgress)
    }
}

impl<V: Vcs, P: Progress> RepoFetcher<V, P> {
    pub fn with_progress(vcs: V, progress: P) -> Self {
        Self { vcs, progress }
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// Fetch the plugin described by `request` and return its staged directory.
    ///
    /// The returned path is always `<plugins_dir>/<id>` with the id read from the
    /// fetched `plugin.xml`. An existing directory there is replaced.
    #[instrument(skip(self, request), fields(url = %request.url, reference = ?request.reference, subdir = ?request.subdir))]
    pub fn fetch(&self, request: &FetchRequest) -> Result<PathBuf> {
        self.vcs.ensure_available()?;

        let subdir = request.subdir_str();
        let cache = request.cache_dir.clone().map(CacheManager::with_cache_dir);

        let layout = match &cache {
            Some(cache) => cache.entry_layout(&request.url, request.reference.as_deref(), subdir),
            None => PluginLayout::new(scratch_dir()?, subdir),
        };

        let cached = cache
            .as_ref()
            .is_some_and(|cache| cache.is_cached(&request.url, request.reference.as_deref(), subdir));
        if cached {
            self.progress.emit(
                Level::Verbose,
                &format!(
                    "found cached version for plugin: {} @ {}",
                    request.source_label(),
                    layout.work_dir().display()
                ),
            );
        } else {
            if let Some(cache) = &cache {
                cache.ensure_cache_dir()?;
                remove_dir_if_exists(layout.work_dir())?;
            }
            self.checkout_fresh(request, layout.work_dir())?;
        }

        self.copy_plugin(&layout, &request.plugins_dir)
    }

    /// Clone into `work_dir` and check out the requested revision.
    fn checkout_fresh(&self, request: &FetchRequest, work_dir: &Path) -> Result<()> {
        self.progress.emit(
            Level::Verbose,
            &format!(
                "Fetching plugin via {} clone: \"{}\" into \"{}\"",
                self.vcs.name(),
                request.url,
                work_dir.display()
            ),
        );
        self.vcs.clone_repo(&request.url, work_dir)?;
        self.progress
            .emit(Level::Verbose, &format!("Plugin \"{}\" fetched.", request.url));

        if let Some(reference) = request.reference.as_deref() {
            self.vcs.checkout(reference, &ExecContext::new(work_dir))?;
            self.progress.emit(
                Level::Log,
                &format!(
                    "Plugin \"{}\" checked out to git ref \"{}\".",
                    request.url, reference
                ),
            );
        }
        Ok(())
    }

    /// Copy the effective source directory to `<plugins_dir>/<id>`.
    fn copy_plugin(&self, layout: &PluginLayout, plugins_dir: &Path) -> Result<PathBuf> {
        let manifest = PluginXml::load(layout.plugin_xml())?;
        let plugin_dir = plugin_dir(plugins_dir, &manifest.id, layout.plugin_xml())?;

        self.progress.emit(
            Level::Verbose,
            &format!("Copying fetched plugin over \"{}\"...", plugin_dir.display()),
        );

        // Same id from another subdirectory of the same repository overwrites this one
        remove_dir_if_exists(&plugin_dir)?;
        std::fs::create_dir_all(&plugin_dir)
            .map_err(|e| Error::PluginCopy(manifest.id.clone(), e))?;
        cache::copy_dir_recursive_exclude_git(layout.source_dir(), &plugin_dir)
            .map_err(|e| Error::PluginCopy(manifest.id.clone(), e))?;

        self.progress
            .emit(Level::Verbose, &format!("Plugin \"{}\" fetched.", manifest.id));
        debug!(plugin = %manifest.id, path = %plugin_dir.display(), "plugin staged");
        Ok(plugin_dir)
    }
}

/// `<plugins_dir>/<id>`, provided the id names exactly one child directory.
///
/// The destination is deleted before copying, so ids like `..`, `/abs` or `a/b`
/// must never reach `join`.
fn plugin_dir(plugins_dir: &Path, id: &str, manifest: &Path) -> Result<PathBuf> {
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == id => Ok(plugins_dir.join(name)),
        _ => Err(Error::InvalidPluginId {
            id: id.to_string(),
            path: manifest.to_path_buf(),
        }),
    }
}

/// A fresh, uniquely named directory under the system temp dir.
///
/// It is left behind after the fetch.
fn scratch_dir() -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir()
        .map_err(Error::Io)?;
    Ok(dir.keep())
}

fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::commit_all;
    use std::fs;
    use std::sync::Mutex;

    /// Stands in for git: "clones" a fixed file set and records every call.
    #[derive(Default)]
    struct FakeVcs {
        files: Vec<(&'static str, String)>,
        /// `(link, target)` symlinks created next to the files.
        links: Vec<(&'static str, &'static str)>,
        missing: bool,
        fail_clone: bool,
        fail_checkout: bool,
        calls: Mutex<Vec<String>>,
        dests: Mutex<Vec<PathBuf>>,
    }

    impl FakeVcs {
        fn with_files(files: Vec<(&'static str, &str)>) -> Self {
            Self {
                files: files
                    .into_iter()
                    .map(|(path, content)| (path, content.to_string()))
                    .collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn dests(&self) -> Vec<PathBuf> {
            self.dests.lock().unwrap().clone()
        }

        fn failure(command: String) -> Error {
            Error::ProcessFailed {
                command,
                code: Some(1),
                stderr: "fatal: nope".to_string(),
                stdout: String::new(),
            }
        }
    }

    impl Vcs for FakeVcs {
        fn name(&self) -> &str {
            "fake"
        }

        fn ensure_available(&self) -> Result<()> {
            if self.missing {
                return Err(Error::ToolMissing {
                    tool: "fake".to_string(),
                    source: which::Error::CannotFindBinaryPath,
                });
            }
            Ok(())
        }

        fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(format!("clone {url}"));
            self.dests.lock().unwrap().push(dest.to_path_buf());
            if self.fail_clone {
                return Err(Self::failure(format!("fake clone {url}")));
            }
            fs::create_dir_all(dest.join(".git")).unwrap();
            fs::write(dest.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
            for (path, content) in &self.files {
                let path = dest.join(path);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
            #[cfg(unix)]
            for (link, target) in &self.links {
                std::os::unix::fs::symlink(target, dest.join(link)).unwrap();
            }
            Ok(())
        }

        fn checkout(&self, reference: &str, ctx: &ExecContext) -> Result<()> {
            self.calls.lock().unwrap().push(format!("checkout {reference}"));
            if self.fail_checkout {
                return Err(Self::failure(format!("fake checkout {reference}")));
            }
            fs::write(ctx.working_dir().join("REF"), reference).unwrap();
            Ok(())
        }
    }

    const DEVICE_XML: &str = r#"<plugin id="org.example.device" version="1.0.0"/>"#;

    fn device_repo() -> FakeVcs {
        FakeVcs::with_files(vec![
            ("plugin.xml", DEVICE_XML),
            ("www/device.js", "// device"),
        ])
    }

    #[test]
    fn test_fetch_without_cache_clones_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let fetcher = RepoFetcher::with_progress(device_repo(), RecordingProgress::new());

        let request = FetchRequest::new("https://example.com/device.git", &plugins_dir);
        let path = fetcher.fetch(&request).unwrap();

        assert_eq!(path, plugins_dir.join("org.example.device"));
        assert_eq!(fetcher.vcs().calls(), vec!["clone https://example.com/device.git"]);
        assert_eq!(
            PluginXml::load(&path.join("plugin.xml")).unwrap().id,
            "org.example.device"
        );
        assert!(path.join("www/device.js").exists());
        assert!(!path.join(".git").exists());
        assert!(!path.join("REF").exists());
    }

    #[test]
    fn test_fetch_checks_out_after_clone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let fetcher = RepoFetcher::with_progress(device_repo(), RecordingProgress::new());

        let request = FetchRequest::new("https://example.com/device.git", &plugins_dir).reference("v1.2");
        let path = fetcher.fetch(&request).unwrap();

        assert_eq!(
            fetcher.vcs().calls(),
            vec!["clone https://example.com/device.git", "checkout v1.2"]
        );
        assert_eq!(fs::read_to_string(path.join("REF")).unwrap(), "v1.2");

        let logs: Vec<_> = fetcher
            .progress()
            .events()
            .into_iter()
            .filter(|(level, _)| *level == Level::Log)
            .collect();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].1.contains("checked out to git ref \"v1.2\""));
    }

    #[test]
    fn test_failed_checkout_skips_copy() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let vcs = FakeVcs {
            fail_checkout: true,
            ..device_repo()
        };
        let fetcher = RepoFetcher::with_progress(vcs, RecordingProgress::new());

        let request = FetchRequest::new("https://example.com/device.git", &plugins_dir).reference("bad");
        let result = fetcher.fetch(&request);

        assert!(matches!(result, Err(Error::ProcessFailed { .. })));
        assert_eq!(
            fetcher.vcs().calls(),
            vec!["clone https://example.com/device.git", "checkout bad"]
        );
        assert!(!plugins_dir.exists());
    }

    #[test]
    fn test_failed_clone_skips_checkout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let vcs = FakeVcs {
            fail_clone: true,
            ..device_repo()
        };
        let fetcher = RepoFetcher::with_progress(vcs, RecordingProgress::new());

        let request = FetchRequest::new("https://example.com/device.git", &plugins_dir).reference("v1");
        let result = fetcher.fetch(&request);

        assert!(matches!(result, Err(Error::ProcessFailed { .. })));
        assert_eq!(fetcher.vcs().calls(), vec!["clone https://example.com/device.git"]);
        assert!(!plugins_dir.exists());
    }

    #[test]
    fn test_missing_tool_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let cache_dir = temp_dir.path().join("cache");
        let vcs = FakeVcs {
            missing: true,
            ..device_repo()
        };
        let fetcher = RepoFetcher::with_progress(vcs, RecordingProgress::new());

        let request = FetchRequest::new("https://example.com/device.git", &plugins_dir)
            .cache_dir(&cache_dir);
        let result = fetcher.fetch(&request);

        assert!(matches!(result, Err(Error::ToolMissing { .. })));
        assert!(fetcher.vcs().calls().is_empty());
        assert!(fetcher.progress().events().is_empty());
        assert!(!plugins_dir.exists());
        assert!(!cache_dir.exists());
    }

    #[test]
    fn test_cache_hit_skips_clone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let cache_dir = temp_dir.path().join("cache");

        let url = "https://example.com/bundle.git";
        let entry = cache_dir.join(cache_key(url, Some("v2"), Some("plugins/camera")));
        fs::create_dir_all(entry.join("plugins/camera")).unwrap();
        fs::write(
            entry.join("plugins/camera/plugin.xml"),
            r#"<plugin id="org.example.camera"/>"#,
        )
        .unwrap();
        fs::write(entry.join("plugins/camera/camera.js"), "// camera").unwrap();

        let fetcher = RepoFetcher::with_progress(device_repo(), RecordingProgress::new());
        let request = FetchRequest::new(url, &plugins_dir)
            .reference("v2")
            .subdir("plugins/camera")
            .cache_dir(&cache_dir);
        let path = fetcher.fetch(&request).unwrap();

        assert_eq!(path, plugins_dir.join("org.example.camera"));
        assert!(fetcher.vcs().calls().is_empty());
        assert!(path.join("camera.js").exists());

        let events = fetcher.progress().events();
        assert!(events[0].1.starts_with("found cached version for plugin: https://example.com/bundle.git#v2"));
    }

    #[test]
    fn test_cache_miss_populates_cache() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let cache_dir = temp_dir.path().join("cache");
        let url = "https://example.com/device.git";

        let fetcher = RepoFetcher::with_progress(device_repo(), RecordingProgress::new());
        let request = FetchRequest::new(url, &plugins_dir).cache_dir(&cache_dir);

        fetcher.fetch(&request).unwrap();
        assert!(cache_dir.join(cache_key(url, None, None)).join("plugin.xml").exists());
        assert!(cache_dir.join("CACHEDIR.TAG").exists());

        // Second fetch is served from the cache
        fetcher.fetch(&request).unwrap();
        assert_eq!(fetcher.vcs().calls(), vec![format!("clone {url}")]);
    }

    #[test]
    fn test_cache_miss_clears_stale_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let cache_dir = temp_dir.path().join("cache");
        let url = "https://example.com/device.git";

        // An entry left behind by an interrupted fetch, without plugin.xml
        let entry = cache_dir.join(cache_key(url, None, None));
        fs::create_dir_all(&entry).unwrap();
        fs::write(entry.join("leftover"), "junk").unwrap();

        let fetcher = RepoFetcher::with_progress(device_repo(), RecordingProgress::new());
        let path = fetcher
            .fetch(&FetchRequest::new(url, &plugins_dir).cache_dir(&cache_dir))
            .unwrap();

        assert!(!entry.join("leftover").exists());
        assert!(!path.join("leftover").exists());
        assert_eq!(fetcher.vcs().calls().len(), 1);
    }

    #[test]
    fn test_fetch_with_subdir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let vcs = FakeVcs::with_files(vec![
            ("README.md", "bundle"),
            ("plugins/geo/plugin.xml", r#"<plugin id="org.example.geo"/>"#),
            ("plugins/geo/src/geo.js", "// geo"),
        ]);
        let fetcher = RepoFetcher::with_progress(vcs, RecordingProgress::new());

        let request = FetchRequest::new("https://example.com/bundle.git", &plugins_dir).subdir("plugins/geo");
        let path = fetcher.fetch(&request).unwrap();

        assert_eq!(path, plugins_dir.join("org.example.geo"));
        assert!(path.join("src/geo.js").exists());
        assert!(!path.join("README.md").exists());
    }

    #[test]
    fn test_refetch_replaces_destination() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let stale = plugins_dir.join("org.example.device/stale.js");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "// old").unwrap();

        let fetcher = RepoFetcher::with_progress(device_repo(), RecordingProgress::new());
        let path = fetcher
            .fetch(&FetchRequest::new("https://example.com/device.git", &plugins_dir))
            .unwrap();

        assert!(!stale.exists());
        assert!(path.join("www/device.js").exists());
    }

    #[test]
    fn test_missing_manifest_propagates_read_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let vcs = FakeVcs::with_files(vec![("README.md", "no manifest here")]);
        let fetcher = RepoFetcher::with_progress(vcs, RecordingProgress::new());

        let result = fetcher.fetch(&FetchRequest::new("https://example.com/x.git", &plugins_dir));
        assert!(matches!(result, Err(Error::FileRead { .. })));
        assert!(!plugins_dir.exists());
    }

    #[test]
    fn test_progress_milestones() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let fetcher = RepoFetcher::with_progress(device_repo(), RecordingProgress::new());

        fetcher
            .fetch(&FetchRequest::new("https://example.com/device.git", &plugins_dir).reference("main"))
            .unwrap();

        let messages: Vec<String> = fetcher.progress().events().into_iter().map(|(_, m)| m).collect();
        assert_eq!(messages.len(), 5);
        assert!(messages[0].starts_with("Fetching plugin via fake clone"));
        assert_eq!(messages[1], "Plugin \"https://example.com/device.git\" fetched.");
        assert!(messages[2].contains("checked out"));
        assert!(messages[3].starts_with("Copying fetched plugin over"));
        assert_eq!(messages[4], "Plugin \"org.example.device\" fetched.");
    }

    #[test]
    fn test_fetch_real_repository_with_libgit() {
        let temp_dir = tempfile::tempdir().unwrap();
        let origin = temp_dir.path().join("origin");
        fs::create_dir_all(origin.join("plugin")).unwrap();
        let repo = git2::Repository::init(&origin).unwrap();

        fs::write(
            origin.join("plugin/plugin.xml"),
            r#"<plugin id="org.example.real" version="1.0.0"/>"#,
        )
        .unwrap();
        let first = commit_all(&repo, "first");
        fs::write(
            origin.join("plugin/plugin.xml"),
            r#"<plugin id="org.example.real" version="2.0.0"/>"#,
        )
        .unwrap();
        commit_all(&repo, "second");

        let plugins_dir = temp_dir.path().join("plugins");
        let fetcher = RepoFetcher::new(crate::vcs::LibGit::new());
        let request = FetchRequest::new(origin.to_str().unwrap(), &plugins_dir)
            .subdir("plugin")
            .reference(first.to_string())
            .cache_dir(temp_dir.path().join("cache"));

        let path = fetcher.fetch(&request).unwrap();
        assert_eq!(path, plugins_dir.join("org.example.real"));

        let manifest = PluginXml::load(&path.join("plugin.xml")).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_plugin_id_must_be_a_plain_name() {
        for id in ["", ".", "..", "/abs", "a/b", "../victim", "a/"] {
            let temp_dir = tempfile::tempdir().unwrap();
            let plugins_dir = temp_dir.path().join("plugins");
            let sibling = plugins_dir.join("org.example.other/keep.js");
            fs::create_dir_all(sibling.parent().unwrap()).unwrap();
            fs::write(&sibling, "// keep").unwrap();
            let victim = temp_dir.path().join("victim/keep.txt");
            fs::create_dir_all(victim.parent().unwrap()).unwrap();
            fs::write(&victim, "keep").unwrap();

            let xml = format!(r#"<plugin id="{id}"/>"#);
            let vcs = FakeVcs::with_files(vec![("plugin.xml", &xml)]);
            let fetcher = RepoFetcher::with_progress(vcs, RecordingProgress::new());

            let result = fetcher.fetch(&FetchRequest::new("https://example.com/evil.git", &plugins_dir));
            assert!(
                matches!(result, Err(Error::InvalidPluginId { id: ref got, .. }) if got == id),
                "id {id:?} gave {result:?}"
            );
            assert!(sibling.exists(), "id {id:?} removed a sibling plugin");
            assert!(victim.exists(), "id {id:?} removed a file outside the plugins dir");

            for scratch in fetcher.vcs().dests() {
                fs::remove_dir_all(scratch).unwrap();
            }
        }
    }

    #[test]
    fn test_plugin_id_accepts_dotted_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");

        assert_eq!(
            plugin_dir(&plugins_dir, "cordova-plugin-device", Path::new("plugin.xml")).unwrap(),
            plugins_dir.join("cordova-plugin-device")
        );
        assert_eq!(
            plugin_dir(&plugins_dir, "org..example", Path::new("plugin.xml")).unwrap(),
            plugins_dir.join("org..example")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_fetch_keeps_symlinks_as_links() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let vcs = FakeVcs {
            links: vec![("linked", "www"), ("escape", "/etc")],
            ..device_repo()
        };
        let fetcher = RepoFetcher::with_progress(vcs, RecordingProgress::new());

        let path = fetcher
            .fetch(&FetchRequest::new("https://example.com/device.git", &plugins_dir))
            .unwrap();

        let linked = path.join("linked");
        assert!(fs::symlink_metadata(&linked).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&linked).unwrap(), Path::new("www"));
        assert!(linked.join("device.js").exists());

        let escape = path.join("escape");
        assert!(fs::symlink_metadata(&escape).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&escape).unwrap(), Path::new("/etc"));
    }

    #[test]
    fn test_fetch_without_cache_leaves_scratch_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        let fetcher = RepoFetcher::with_progress(device_repo(), RecordingProgress::new());

        fetcher
            .fetch(&FetchRequest::new("https://example.com/device.git", &plugins_dir))
            .unwrap();

        let dests = fetcher.vcs().dests();
        assert_eq!(dests.len(), 1);
        let scratch = &dests[0];
        let name = scratch.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(SCRATCH_PREFIX), "unexpected scratch dir {name}");
        assert!(!scratch.starts_with(&plugins_dir));
        assert!(scratch.join("plugin.xml").exists());
        assert!(scratch.join(".git").exists());

        fs::remove_dir_all(scratch).unwrap();
    }
}
