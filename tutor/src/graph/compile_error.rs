//! Transition table compilation error.
//!
//! Returned by `TransitionTable::compile` when edges reference steps missing from the
//! registry or a step's outgoing edges are ambiguous.

use thiserror::Error;

use crate::state::NextAction;

use super::StepName;

#[derive(Debug, Error)]
pub enum CompilationError {
    /// An edge names a step that was never registered.
    #[error("step not registered: {0}")]
    StepNotRegistered(StepName),

    /// No entry edge: a fresh session would have nowhere to go.
    #[error("transition table has no entry edge")]
    MissingEntry,

    /// A step has both an unconditional edge and conditional branches.
    #[error("step has both edge and conditional edges: {0}")]
    EdgeAndConditional(StepName),

    /// The same `(step, next_action)` pair maps to two targets.
    #[error("duplicate branch from {step} on {next_action}")]
    DuplicateBranch {
        step: StepName,
        next_action: NextAction,
    },

    /// Nothing ever halts, so every run would hit the step ceiling.
    #[error("transition table never halts")]
    NoHalt,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of StepNotRegistered names the step.
    #[test]
    fn display_step_not_registered() {
        let s = CompilationError::StepNotRegistered(StepName::Feedback).to_string();
        assert!(s.contains("not registered"), "{}", s);
        assert!(s.contains("feedback"), "{}", s);
    }

    /// **Scenario**: Display of DuplicateBranch names both the step and the routing value.
    #[test]
    fn display_duplicate_branch() {
        let s = CompilationError::DuplicateBranch {
            step: StepName::Probe,
            next_action: NextAction::WaitForResponse,
        }
        .to_string();
        assert!(s.contains("probe") && s.contains("wait_for_response"), "{}", s);
    }
}
