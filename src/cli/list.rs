use std::path::PathBuf;

use crate::Result;
use crate::config::Settings;
use crate::plugins::{describe_plugins, list_plugins};

/// List the plugins staged in the plugins directory.
pub fn run(settings: &Settings, plugins_dir: Option<PathBuf>, long: bool, json: bool) -> Result<()> {
    let plugins_dir = super::plugins_dir(settings, plugins_dir)?;

    if json {
        let plugins = describe_plugins(&plugins_dir)?;
        println!("{}", serde_json::to_string_pretty(&plugins)?);
        return Ok(());
    }

    if long {
        let plugins = describe_plugins(&plugins_dir)?;
        if plugins.is_empty() {
            println!("No plugins in {}", plugins_dir.display());
        }
        for plugin in &plugins {
            let mut parts = vec![format!("  {}", plugin.dir)];
            match (&plugin.id, &plugin.version) {
                (Some(id), Some(version)) if id != &plugin.dir => parts.push(format!("({id} v{version})")),
                (Some(id), None) if id != &plugin.dir => parts.push(format!("({id})")),
                (Some(_), Some(version)) => parts.push(format!("v{version}")),
                (Some(_), None) => {}
                (None, _) => parts.push("[no plugin.xml]".to_string()),
            }
            if let Some(name) = &plugin.name {
                parts.push(format!("- {name}"));
            }
            println!("{}", parts.join(" "));
        }
        return Ok(());
    }

    let mut plugins = list_plugins(&plugins_dir)?;
    plugins.sort();
    for plugin in plugins {
        println!("{plugin}");
    }
    Ok(())
}
