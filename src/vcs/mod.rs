mod cli;
mod libgit;

pub use cli::GitCli;
pub use libgit::LibGit;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Result;

/// Where a version-control operation runs.
///
/// Passed explicitly so no operation depends on the process-wide current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecContext {
    working_dir: PathBuf,
}

impl ExecContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// The operations the fetcher needs from a version-control tool.
pub trait Vcs {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Fail with [`crate::Error::ToolMissing`] if the tool cannot be used.
    fn ensure_available(&self) -> Result<()>;

    /// Clone `url` into `dest`.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Check out `reference` in the repository at `ctx`.
    fn checkout(&self, reference: &str, ctx: &ExecContext) -> Result<()>;
}

impl<T: Vcs + ?Sized> Vcs for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn ensure_available(&self) -> Result<()> {
        (**self).ensure_available()
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        (**self).clone_repo(url, dest)
    }

    fn checkout(&self, reference: &str, ctx: &ExecContext) -> Result<()> {
        (**self).checkout(reference, ctx)
    }
}

/// Which backend performs clone and checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Spawn the `git` executable.
    #[default]
    Cli,
    /// Clone in-process with libgit2.
    Libgit,
}

impl Backend {
    /// Build the backend; `program` only matters for [`Backend::Cli`].
    pub fn build(self, program: &str) -> Box<dyn Vcs + Send + Sync> {
        match self {
            Backend::Cli => Box::new(GitCli::new(program)),
            Backend::Libgit => Box::new(LibGit::new()),
        }
    }
}
