use async_trait::async_trait;

use crate::graph::{Step, StepError, StepName};
use crate::state::{Calibre, NextAction, SessionState, Understanding};

/// Turns the latest classification into feedback and decides whether to re-probe,
/// re-explain, or move on.
pub struct FeedbackStep {
    max_re_explain: Option<u32>,
}

impl FeedbackStep {
    /// `max_re_explain = Some(n)` moves a struggling learner on once `n` non-understood
    /// outcomes pile up on one takeaway.
    pub fn new(max_re_explain: Option<u32>) -> Self {
        Self { max_re_explain }
    }
}

fn praise(calibre: Calibre) -> &'static str {
    match calibre {
        Calibre::HighIq => "Excellent, that's exactly it.",
        Calibre::Medium => "Great job, that's right!",
        Calibre::Dull => "Well done! You're getting the hang of this.",
    }
}

fn simpler_explanation(attempt: u32) -> &'static str {
    match attempt {
        0 | 1 => "No worries, let's look at it from a different angle.",
        2 => "Let's break it down step by step.",
        _ => "Let's slow down and focus on just one thing at a time.",
    }
}

fn hint(state: &SessionState) -> String {
    let params: Vec<String> = state
        .current_takeaway()
        .map(|t| t.parameters_to_vary.clone())
        .unwrap_or_default();
    if params.is_empty() {
        "You're on the right track. Look closely at what changes in the simulation.".to_string()
    } else {
        format!(
            "You're on the right track. Try adjusting {} and watch what happens.",
            params.join(" and ")
        )
    }
}

/// Next takeaway, or concept completion when the list runs out.
fn advance(state: &mut SessionState) -> NextAction {
    let t = &mut state.teaching;
    t.current_takeaway_index += 1;
    t.re_explain_count = 0;
    if t.current_takeaway_index >= t.takeaways.len() {
        state.complete_concept();
        NextAction::Route
    } else {
        NextAction::Teach
    }
}

#[async_trait]
impl Step for FeedbackStep {
    fn name(&self) -> StepName {
        StepName::Feedback
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let Some(status) = state.teaching.understanding_status.clone() else {
            return Err(StepError::InvalidState(
                "feedback requires a classified response".into(),
            ));
        };

        if status.label == Understanding::Understood {
            let message = praise(state.learner.calibre).to_string();
            state.say(message.clone());
            state.teaching.feedback_message = Some(message);
            let next = advance(&mut state);
            state.next_action = next;
            return Ok(state);
        }

        let attempts = state.teaching.re_explain_count + 1;
        if self.max_re_explain.is_some_and(|max| attempts >= max) {
            tracing::info!(
                session_id = %state.session_id,
                attempts,
                "re-explain limit reached, moving on"
            );
            let message = "That's a tricky one. Let's move on for now and come back to it later.";
            state.say(message);
            state.teaching.feedback_message = Some(message.to_string());
            let next = advance(&mut state);
            state.next_action = next;
            return Ok(state);
        }

        state.teaching.re_explain_count = attempts;
        if status.label == Understanding::Partial {
            let message = hint(&state);
            state.say(message.clone());
            state.teaching.feedback_message = Some(message);
            state.next_action = NextAction::Probe;
        } else {
            // teach opens its re-explanation with this message
            state.teaching.feedback_message = Some(simpler_explanation(attempts).to_string());
            state.next_action = NextAction::Teach;
        }
        Ok(state)
    }
}
