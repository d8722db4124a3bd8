//! Read a project `.env` into a key-value map without touching the process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Loads `.env` from `override_dir` (or the current directory). Missing file yields an empty map.
///
/// Parsing is delegated to `dotenv::from_path_iter`, which handles quoting, `export` prefixes
/// and variable substitution; nothing is written to the environment here.
pub fn load_env_map(override_dir: Option<&Path>) -> Result<HashMap<String, String>, LoadError> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(HashMap::new());
    };
    // `from_path_iter` is the only dotenv 0.15 entry point that parses without setting vars.
    #[allow(deprecated)]
    let iter = dotenv::from_path_iter(&path).map_err(|e| LoadError::Dotenv(e.to_string()))?;
    let mut out = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| LoadError::Dotenv(e.to_string()))?;
        out.insert(key, value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn reads_plain_and_quoted_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "# tutor settings\nTUTOR_MAX_STEPS=40\nTUTOR_MODEL=\"gpt-4o-mini\"\n",
        )
        .unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m.get("TUTOR_MAX_STEPS").map(String::as_str), Some("40"));
        assert_eq!(m.get("TUTOR_MODEL").map(String::as_str), Some("gpt-4o-mini"));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "NOT A PAIR\n").unwrap();
        let r = load_env_map(Some(dir.path()));
        assert!(matches!(r, Err(LoadError::Dotenv(_))));
    }
}
