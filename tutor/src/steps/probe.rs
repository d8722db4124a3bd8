use async_trait::async_trait;

use crate::graph::{Step, StepError, StepName};
use crate::state::{NextAction, SessionState};

/// Asks the current takeaway's probing question and halts for the learner's reply.
///
/// The reply itself is recorded by [`crate::resume::ResumeAdapter`] before the next run.
pub struct ProbeStep;

#[async_trait]
impl Step for ProbeStep {
    fn name(&self) -> StepName {
        StepName::Probe
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let question = match state.current_takeaway() {
            Some(t) if !t.probing_question.trim().is_empty() => t.probing_question.clone(),
            Some(_) | None => {
                let concept = state
                    .current_concept()
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| state.simulation_name().to_string());
                format!("What do you notice about {concept} in the simulation?")
            }
        };
        state.say(question);
        state.next_action = NextAction::WaitForResponse;
        Ok(state)
    }
}
