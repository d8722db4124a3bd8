//! Read `$XDG_CONFIG_HOME/<app>/config.toml`: the `[env]` table and arbitrary typed sections.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::LoadError;

/// `$XDG_CONFIG_HOME` wins over the platform default so tests and containers can redirect it.
fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))
}

pub(crate) fn config_path(app_name: &str) -> Result<Option<PathBuf>, LoadError> {
    let path = config_home()?.join(app_name).join("config.toml");
    Ok(path.is_file().then_some(path))
}

fn read_table(app_name: &str) -> Result<Option<toml::Table>, LoadError> {
    let Some(path) = config_path(app_name)? else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    Ok(Some(toml::from_str::<toml::Table>(&content)?))
}

/// Returns the `[env]` table as strings. Missing file or section returns an empty map.
///
/// Non-string scalars (`TUTOR_MAX_STEPS = 40`) are accepted and rendered with `to_string`.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let Some(table) = read_table(app_name)? else {
        return Ok(HashMap::new());
    };
    let Some(toml::Value::Table(env)) = table.get("env") else {
        return Ok(HashMap::new());
    };
    Ok(env
        .iter()
        .map(|(k, v)| {
            let value = match v {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect())
}

/// Deserializes `[section]` into `T`; `Ok(None)` when the file or section is absent.
pub fn read_section<T: DeserializeOwned>(
    app_name: &str,
    section: &str,
) -> Result<Option<T>, LoadError> {
    let Some(mut table) = read_table(app_name)? else {
        return Ok(None);
    };
    let Some(value) = table.remove(section) else {
        return Ok(None);
    };
    let parsed = value
        .try_into::<T>()
        .map_err(|e| LoadError::Section {
            section: section.to_string(),
            message: e.to_string(),
        })?;
    Ok(Some(parsed))
}
