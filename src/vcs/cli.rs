use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, instrument, trace};

use super::{ExecContext, Vcs};
use crate::{Error, Result};

/// Drives the `git` command line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    /// Use `program` (a name looked up on `PATH`, or a path) as the git executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn locate(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|e| Error::ToolMissing {
            tool: self.program.clone(),
            source: e,
        })
    }

    /// Run `git <args>` and fail unless it exits successfully.
    #[instrument(skip(self, args), fields(command))]
    fn run<I, S>(&self, args: I, cwd: Option<&Path>) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = self.locate()?;
        let mut cmd = Command::new(&program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let command = display_command(&self.program, &cmd);
        tracing::Span::current().record("command", command.as_str());

        debug!("spawning");
        let output = cmd.output().map_err(|e| Error::ProcessSpawn {
            command: command.clone(),
            source: e,
        })?;
        trace!(
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "process finished"
        );

        if !output.status.success() {
            debug!(code = ?output.status.code(), "process failed");
            return Err(Error::ProcessFailed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            });
        }
        Ok(())
    }
}

/// Render a command the way a user would type it, quoting every argument.
fn display_command(program: &str, cmd: &Command) -> String {
    let mut out = program.to_string();
    for arg in cmd.get_args() {
        out.push_str(&format!(" \"{}\"", arg.to_string_lossy()));
    }
    out
}

impl Vcs for GitCli {
    fn name(&self) -> &str {
        &self.program
    }

    fn ensure_available(&self) -> Result<()> {
        let path = self.locate()?;
        trace!(path = %path.display(), "found git executable");
        Ok(())
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.run(clone_args(url, dest), None)
    }

    fn checkout(&self, reference: &str, ctx: &ExecContext) -> Result<()> {
        // `git checkout -- <ref>` would treat the ref as a path, so option-like refs are refused
        if reference.starts_with('-') {
            return Err(Error::InvalidReference(reference.to_string()));
        }
        self.run(["checkout", reference], Some(ctx.working_dir()))
    }
}

/// `clone -- <url> <dest>`; the separator keeps a URL starting with `-` from being read as an option.
fn clone_args<'a>(url: &'a str, dest: &'a Path) -> [&'a OsStr; 4] {
    [
        OsStr::new("clone"),
        OsStr::new("--"),
        OsStr::new(url),
        dest.as_os_str(),
    ]
}
