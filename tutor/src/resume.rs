//! Resume adapter: writes a learner's reply into a halted checkpoint.
//!
//! This is the `record_answer` half of probing. `probe` only asks; the reply arrives
//! from outside the engine, after the run has halted on `wait_for_response`.

use crate::graph::{RoutingError, StepName};
use crate::memory::Checkpoint;
use crate::state::{ChatMessage, Interaction, McqAnswer, NextAction, SessionState};
use crate::steps::timestamp;

/// Output of [`ResumeAdapter::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resumed {
    pub checkpoint: Checkpoint<SessionState>,
    /// `false` when the checkpoint was not waiting for input and is returned unchanged.
    pub applied: bool,
}

pub struct ResumeAdapter;

impl ResumeAdapter {
    /// Records `answer` against the halt the checkpoint is waiting on.
    ///
    /// * halted by `probe`: appends an unclassified interaction for the last agent message
    ///   and continues at `check_understanding`.
    /// * halted by `assess`: records the reply for the current MCQ and continues at `assess`.
    ///
    /// A checkpoint that is not waiting is returned as-is (`applied = false`), so replaying
    /// a resume never records the same answer twice.
    pub fn apply(
        checkpoint: Checkpoint<SessionState>,
        answer: &str,
    ) -> Result<Resumed, RoutingError> {
        if checkpoint.state.next_action != NextAction::WaitForResponse {
            return Ok(Resumed {
                checkpoint,
                applied: false,
            });
        }
        let mut state = checkpoint.state.clone();
        let answer = answer.trim();
        let step = match checkpoint.last_completed_step {
            Some(StepName::Probe) => {
                let question = state.last_agent_message().unwrap_or_default().to_string();
                state.teaching.interactions.push(Interaction {
                    timestamp: timestamp(),
                    agent_message: question,
                    student_response: answer.to_string(),
                    understanding_status: None,
                });
                state.next_action = NextAction::CheckUnderstanding;
                StepName::Probe
            }
            Some(StepName::Assess) if state.assessment.is_some() => {
                if let Some(assessment) = state.assessment.as_mut() {
                    if let Some(mcq) = assessment.mcqs.get(assessment.current_index) {
                        assessment.answers.push(McqAnswer {
                            mcq_id: mcq.id,
                            reply: answer.to_string(),
                            choice: mcq.interpret(answer),
                            correct: None,
                        });
                    }
                }
                state.next_action = NextAction::Assess;
                StepName::Assess
            }
            other => {
                return Err(RoutingError {
                    step: other,
                    next_action: NextAction::WaitForResponse,
                })
            }
        };
        state.messages.push(ChatMessage::learner(answer));
        tracing::debug!(
            session_id = %checkpoint.session_id,
            halted_at = %step,
            "recorded learner answer"
        );
        Ok(Resumed {
            checkpoint: checkpoint.successor(state, Some(step)),
            applied: true,
        })
    }
}
