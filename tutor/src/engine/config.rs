//! Engine limits and sizing, from defaults, the `[engine]` table of the XDG config file,
//! or `TUTOR_*` environment variables.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("load config: {0}")]
    Load(#[from] env_config::LoadError),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Limits injected into the engine and, through the registry, into the steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Steps executed per run/resume call before `RunawayExecution`.
    pub max_steps: usize,
    /// Non-understood outcomes on one takeaway before feedback moves on. `None`: unbounded.
    pub max_re_explain: Option<u32>,
    pub concepts_per_session: usize,
    pub takeaways_per_concept: usize,
    pub assessment_questions: usize,
    /// SQLite checkpoint file; the in-memory store is used when unset.
    pub checkpoint_db: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 25,
            max_re_explain: None,
            concepts_per_session: 3,
            takeaways_per_concept: 2,
            assessment_questions: 3,
            checkpoint_db: None,
        }
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl EngineConfig {
    /// Applies `.env` and the XDG `[env]` table to the process environment, then layers
    /// `TUTOR_*` variables over the `[engine]` table of `~/.config/tutor/config.toml`.
    pub fn from_env() -> Result<Self, ConfigError> {
        env_config::load_and_apply("tutor", None)?;
        Self::layered("tutor", |key| std::env::var(key).ok())
    }

    /// `[engine]` table of `app`'s config file (or defaults), with `lookup` variables on top.
    pub fn layered(
        app: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_file_section(app)?.with_env_lookup(lookup)
    }

    /// The `[engine]` table of `$XDG_CONFIG_HOME/{app}/config.toml`, or defaults when absent.
    pub fn from_file_section(app: &str) -> Result<Self, ConfigError> {
        Ok(env_config::read_section::<EngineConfig>(app, "engine")?.unwrap_or_default())
    }

    /// Overrides fields from variables found by `lookup`.
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("TUTOR_MAX_STEPS") {
            self.max_steps = parse_num("TUTOR_MAX_STEPS", &v)?;
        }
        if let Some(v) = lookup("TUTOR_MAX_RE_EXPLAIN") {
            let t = v.trim();
            self.max_re_explain = if t.is_empty() || t.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_num("TUTOR_MAX_RE_EXPLAIN", t)?)
            };
        }
        if let Some(v) = lookup("TUTOR_CONCEPTS_PER_SESSION") {
            self.concepts_per_session = parse_num("TUTOR_CONCEPTS_PER_SESSION", &v)?;
        }
        if let Some(v) = lookup("TUTOR_TAKEAWAYS_PER_CONCEPT") {
            self.takeaways_per_concept = parse_num("TUTOR_TAKEAWAYS_PER_CONCEPT", &v)?;
        }
        if let Some(v) = lookup("TUTOR_ASSESSMENT_QUESTIONS") {
            self.assessment_questions = parse_num("TUTOR_ASSESSMENT_QUESTIONS", &v)?;
        }
        if let Some(v) = lookup("TUTOR_CHECKPOINT_DB") {
            if !v.trim().is_empty() {
                self.checkpoint_db = Some(PathBuf::from(v.trim()));
            }
        }
        Ok(self)
    }
}
