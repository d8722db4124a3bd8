use std::path::{Path, PathBuf};
use std::sync::Arc;

use tutor::{
    ConfigError, ContentProvider, EngineConfig, EngineError, JsonSerializer, MockProvider,
    OpenAiProvider, SessionState, SqliteSaver,
};

/// Checkpoint file used when neither `--db` nor `TUTOR_CHECKPOINT_DB` is given.
pub const DEFAULT_DB: &str = "tutor-sessions.db";

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("open checkpoint store {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: tutor::CheckpointError,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// SQLite-backed engine. `offline` swaps the OpenAI provider for an unscripted mock, so every
/// step uses its built-in fallback content and the keyword classifier.
pub fn build_engine(
    config: EngineConfig,
    db: Option<&Path>,
    offline: bool,
) -> Result<tutor::TutorEngine, SetupError> {
    let path = db
        .map(Path::to_path_buf)
        .or_else(|| config.checkpoint_db.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB));
    let saver = SqliteSaver::<SessionState>::new(&path, Arc::new(JsonSerializer))
        .map_err(|source| SetupError::Store {
            path: path.clone(),
            source,
        })?;
    let provider: Arc<dyn ContentProvider> = if offline {
        Arc::new(MockProvider::new())
    } else {
        Arc::new(OpenAiProvider::from_env())
    };
    tracing::debug!(db = %path.display(), offline, "engine ready");
    Ok(tutor::TutorEngine::new(Arc::new(saver), provider, config)?)
}
