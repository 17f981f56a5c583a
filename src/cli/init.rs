use std::path::PathBuf;

use crate::config::Settings;
use crate::{Error, Result};

/// Create a new config.toml.
pub fn run(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Settings::global_path().ok_or_else(|| {
            Error::FileWrite {
                path: PathBuf::from("config.toml"),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine global config directory",
                ),
            }
        })?,
    };

    Settings::write_template(&path)?;

    println!("Created {}", path.display());
    Ok(())
}
