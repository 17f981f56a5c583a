use git2::{FetchOptions, RemoteCallbacks, Repository};
use std::path::Path;
use tracing::{debug, instrument};

use super::{ExecContext, Vcs};
use crate::{Error, Result};

/// Clones and checks out in-process with libgit2; needs no external executable.
#[derive(Debug, Clone, Default)]
pub struct LibGit;

impl LibGit {
    pub fn new() -> Self {
        Self
    }

    fn fetch_options<'a>() -> FetchOptions<'a> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            // Try SSH agent first for git@ URLs
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Some(username) = username_from_url {
                    return git2::Cred::ssh_key_from_agent(username);
                }
            }
            git2::Cred::default()
        });

        let mut fo = FetchOptions::new();
        fo.remote_callbacks(callbacks);
        fo
    }

    /// Resolve a branch, tag or commit, trying the remote-tracking branch last.
    fn resolve<'r>(repo: &'r Repository, reference: &str) -> std::result::Result<git2::Commit<'r>, git2::Error> {
        let object = match repo.revparse_single(reference) {
            Ok(object) => object,
            Err(e) => {
                debug!(error = %e, "not a local revision, trying origin");
                repo.revparse_single(&format!("origin/{reference}"))?
            }
        };
        object.peel_to_commit()
    }
}

impl Vcs for LibGit {
    fn name(&self) -> &str {
        "libgit2"
    }

    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    #[instrument(skip(self))]
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(Error::CacheCreate)?;
        }

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(Self::fetch_options());

        builder.clone(url, dest).map_err(|e| Error::GitClone {
            url: url.to_string(),
            source: e,
        })?;
        debug!("clone complete");
        Ok(())
    }

    #[instrument(skip(self))]
    fn checkout(&self, reference: &str, ctx: &ExecContext) -> Result<()> {
        let checkout_err = |e| Error::GitCheckout {
            reference: reference.to_string(),
            source: e,
        };

        let repo = Repository::open(ctx.working_dir()).map_err(checkout_err)?;
        let commit = Self::resolve(&repo, reference).map_err(checkout_err)?;

        debug!(commit = %commit.id(), "checking out tree");
        repo.checkout_tree(
            commit.as_object(),
            Some(git2::build::CheckoutBuilder::new().force()),
        )
        .map_err(checkout_err)?;

        debug!("setting HEAD to detached state");
        repo.set_head_detached(commit.id()).map_err(checkout_err)?;
        Ok(())
    }
}
