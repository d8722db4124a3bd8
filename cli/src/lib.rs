//! Library half of the `tutor` binary: argument parsing, engine wiring and terminal output.

pub mod display;
mod setup;

pub use setup::{build_engine, SetupError, DEFAULT_DB};

use tutor::{Calibre, Level, SimulationParameter};

/// `beginner` / `intermediate` / `advanced`, case-insensitive.
pub fn parse_level(s: &str) -> Result<Level, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "beginner" => Ok(Level::Beginner),
        "intermediate" => Ok(Level::Intermediate),
        "advanced" => Ok(Level::Advanced),
        other => Err(format!("unknown level: {other}")),
    }
}

/// `dull` / `medium` / `high` (or `high-iq`), case-insensitive.
pub fn parse_calibre(s: &str) -> Result<Calibre, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "dull" => Ok(Calibre::Dull),
        "medium" => Ok(Calibre::Medium),
        "high" | "high-iq" | "high iq" => Ok(Calibre::HighIq),
        other => Err(format!("unknown calibre: {other}")),
    }
}

/// `name`, `name=default` or `name=default:min..max`.
pub fn parse_param(s: &str) -> Result<SimulationParameter, String> {
    let (name, rest) = match s.split_once('=') {
        Some((n, r)) => (n.trim(), Some(r.trim())),
        None => (s.trim(), None),
    };
    if name.is_empty() {
        return Err(format!("parameter needs a name: {s:?}"));
    }
    let mut param = SimulationParameter {
        name: name.to_string(),
        label: None,
        min: None,
        max: None,
        default: None,
    };
    let Some(rest) = rest else {
        return Ok(param);
    };
    let (default, range) = match rest.split_once(':') {
        Some((d, r)) => (d.trim(), Some(r.trim())),
        None => (rest, None),
    };
    if !default.is_empty() {
        param.default = Some(
            default
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(default.to_string())),
        );
    }
    if let Some(range) = range {
        let (lo, hi) = range
            .split_once("..")
            .ok_or_else(|| format!("range must look like min..max: {range:?}"))?;
        let bound = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("bad bound {v:?} in {s:?}"))
        };
        param.min = Some(bound(lo)?);
        param.max = Some(bound(hi)?);
    }
    Ok(param)
}
