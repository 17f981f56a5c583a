pub mod cli;
pub mod config;
pub mod fetcher;
pub mod layout;
pub mod plugins;
pub mod vcs;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Settings errors
    #[error("failed to parse settings: {0}")]
    SettingsParse(String),

    #[error("settings already exist at {0}")]
    SettingsExists(PathBuf),

    #[error("no plugins directory configured (pass --plugins-dir or set plugins_dir in {0})")]
    NoPluginsDir(String),

    // Version-control errors
    #[error("\"{tool}\" command line tool is not installed: make sure it is accessible on your PATH")]
    ToolMissing {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to run `{command}`: {source}")]
    ProcessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {}", exit_label(.code), process_output(.stderr, .stdout))]
    ProcessFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    #[error("refusing to check out '{0}': references must not start with '-'")]
    InvalidReference(String),

    #[error("failed to clone '{url}': {source}")]
    GitClone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("failed to check out '{reference}': {source}")]
    GitCheckout {
        reference: String,
        #[source]
        source: git2::Error,
    },

    // Manifest errors
    #[error("failed to parse plugin.xml at {path}: {reason}")]
    PluginXmlParse { path: PathBuf, reason: String },

    #[error("plugin.xml at {0} has no id attribute on its root element")]
    PluginIdMissing(PathBuf),

    #[error("plugin id '{id}' in {path} is not a plain directory name")]
    InvalidPluginId { id: String, path: PathBuf },

    // Filesystem errors
    #[error("failed to create cache directory: {0}")]
    CacheCreate(#[source] std::io::Error),

    #[error("failed to copy plugin '{0}': {1}")]
    PluginCopy(String, #[source] std::io::Error),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "signal".to_string(),
    }
}

/// Pick whichever captured stream says something; git writes most diagnostics to stderr.
fn process_output<'a>(stderr: &'a str, stdout: &'a str) -> &'a str {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim()
    } else {
        stderr
    }
}
