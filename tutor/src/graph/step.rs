//! Step trait: one named unit of work in the tutoring graph.
//!
//! Receives the session state, returns the successor state. Routing is not returned
//! separately: the step writes `next_action` and the transition table reads it.

use async_trait::async_trait;

use crate::content::ProviderError;
use crate::state::SessionState;

use super::StepName;

/// Failure inside a step. Expected domain conditions ("no concepts left") are never errors;
/// they are expressed through `next_action`.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// External content/classification service failed; retrying the step may succeed.
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),
    /// The state handed to the step breaks an initializer contract.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// One step: state in, state out.
///
/// Fields a step does not touch are carried over unchanged; list fields are rebuilt by the
/// step itself (prior elements included). Steps must tolerate being re-run with the same
/// input, since a crash between running and checkpointing replays them.
///
/// **Interaction**: Registered in `StepRegistry`; invoked by `TutorEngine` whenever the
/// `TransitionTable` resolves to this step's name.
#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> StepName;

    async fn run(&self, state: SessionState) -> Result<SessionState, StepError>;
}
