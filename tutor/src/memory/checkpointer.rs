//! Checkpointer trait and CheckpointError.
//!
//! Keeps the latest checkpoint per session id.

use async_trait::async_trait;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem};

/// Error type for checkpoint operations.
///
/// Used by Checkpointer::get, put, delete, list_sessions and by Serializer.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("session_id required")]
    SessionIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The stored version is not the one this writer started from.
    #[error("version conflict for {session_id}: expected stored version {expected}, found {found}")]
    Conflict {
        session_id: String,
        expected: u64,
        /// 0 when nothing is stored.
        found: u64,
    },
}

impl CheckpointError {
    pub(crate) fn check_version(
        session_id: &str,
        incoming: u64,
        stored: Option<u64>,
    ) -> Result<(), CheckpointError> {
        let expected = incoming.saturating_sub(1);
        let found = stored.unwrap_or(0);
        if found == expected && incoming >= 1 {
            Ok(())
        } else {
            Err(CheckpointError::Conflict {
                session_id: session_id.to_string(),
                expected,
                found,
            })
        }
    }
}

/// Persists the latest checkpoint per session.
///
/// Contract: `put` followed by `get` on the same session id returns what was put
/// (read-after-write), and `put` is atomic per session: it either replaces the stored
/// checkpoint whole or leaves it untouched.
///
/// `put` is also an optimistic version check: `checkpoint.version` must be exactly one more
/// than the stored version (or 1 for a new session), otherwise `CheckpointError::Conflict`.
///
/// Implementations: MemorySaver (in-memory), SqliteSaver (file-backed).
///
/// **Interaction**: Owned by `TutorEngine` as `Arc<dyn Checkpointer<SessionState>>`; read at
/// the start of every run and written after every step and every applied resume.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Latest checkpoint for the session, if any.
    async fn get(&self, session_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError>;

    /// Replace the session's checkpoint. Returns the version now stored.
    async fn put(&self, checkpoint: &Checkpoint<S>) -> Result<u64, CheckpointError>;

    /// Remove the session's checkpoint. Returns whether one existed.
    async fn delete(&self, session_id: &str) -> Result<bool, CheckpointError>;

    /// All stored sessions, ordered by session id.
    async fn list_sessions(&self) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}
