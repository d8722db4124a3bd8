//! Logging helpers for engine runs and step execution.
//!
//! Structured `tracing` events with `session_id`, `step` and `next_action` fields.

use crate::state::NextAction;

use super::StepName;

pub fn log_run_start(session_id: &str, last_step: Option<StepName>, next_action: NextAction) {
    tracing::info!(
        session_id,
        last_step = StepName::label(last_step),
        %next_action,
        "Starting run"
    );
}

pub fn log_step_start(session_id: &str, step: StepName) {
    tracing::debug!(session_id, %step, "Starting step");
}

pub fn log_step_complete(session_id: &str, step: StepName, next_action: NextAction, version: u64) {
    tracing::debug!(session_id, %step, %next_action, version, "Step complete, checkpoint written");
}

/// Run halted: awaiting learner input, or the session is done.
pub fn log_run_halt(session_id: &str, last_step: Option<StepName>, next_action: NextAction, steps_taken: usize) {
    tracing::info!(
        session_id,
        last_step = StepName::label(last_step),
        %next_action,
        steps_taken,
        "Run halted"
    );
}

pub fn log_run_error(session_id: &str, error: &crate::error::EngineError) {
    tracing::error!(session_id, %error, "Run failed");
}

/// A provider returned unusable output and the step substituted a placeholder.
pub fn log_content_fallback(session_id: &str, step: StepName, reason: &str) {
    tracing::warn!(session_id, %step, reason, "Content fallback");
}
