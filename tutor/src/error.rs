//! Public error type for engine operations.

use crate::graph::{CompilationError, RoutingError, StepError, StepName};
use crate::memory::CheckpointError;

/// Error returned by `TutorEngine` operations.
///
/// Recoverable errors leave the last checkpoint intact; the caller retries with
/// `TutorEngine::run(session_id, None)`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A step produced a `next_action` its outgoing transitions do not cover.
    #[error("routing failed for session {session_id}: {source}")]
    Routing {
        session_id: String,
        #[source]
        source: RoutingError,
    },
    #[error("session {session_id} exceeded {max_steps} steps (last step: {})", StepName::label(*.last_step))]
    RunawayExecution {
        session_id: String,
        max_steps: usize,
        last_step: Option<StepName>,
    },
    #[error("step {step} failed for session {session_id}: {source}")]
    StepExecution {
        session_id: String,
        step: StepName,
        #[source]
        source: StepError,
    },
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("session already exists: {0}")]
    SessionExists(String),
    #[error("invalid initial state: {0}")]
    InvalidInitialState(String),
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
}

impl EngineError {
    /// A transient failure; the session can continue from its last checkpoint.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::StepExecution { .. }
                | EngineError::Checkpoint(CheckpointError::Conflict { .. })
        )
    }
}
