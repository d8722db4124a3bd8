use std::sync::Arc;

use async_trait::async_trait;

use crate::content::{parse, ContentProvider, ContentRequest};
use crate::graph::logging::log_content_fallback;
use crate::graph::{Step, StepError, StepName};
use crate::state::{Concept, DisplayMode, NextAction, SessionState, SimulationParameter, Takeaway};

use super::provider_outcome;

/// Plans the takeaways for the current concept and resets per-concept progress.
pub struct PlanStep {
    provider: Arc<dyn ContentProvider>,
    takeaways_per_concept: usize,
}

impl PlanStep {
    pub fn new(provider: Arc<dyn ContentProvider>, takeaways_per_concept: usize) -> Self {
        Self {
            provider,
            takeaways_per_concept: takeaways_per_concept.max(1),
        }
    }
}

/// Two generic takeaways built from the concept text and the first two controls.
pub(crate) fn placeholder_takeaways(
    concept: &Concept,
    parameters: &[SimulationParameter],
) -> Vec<Takeaway> {
    let names: Vec<String> = parameters.iter().take(2).map(|p| p.name.clone()).collect();
    let description = if concept.description.trim().is_empty() {
        "Explore the simulation to learn more."
    } else {
        concept.description.as_str()
    };
    vec![
        Takeaway {
            id: 1,
            explanation: format!("Understanding {}: {}", concept.name, description),
            parameters_to_vary: names.iter().take(1).cloned().collect(),
            parameter_values: Default::default(),
            probing_question: format!("What do you observe about {}?", concept.name),
            display_mode: DisplayMode::Single,
            before_state: None,
            after_state: None,
        },
        Takeaway {
            id: 2,
            explanation: format!(
                "Let's explore how different parameters affect {}.",
                concept.name
            ),
            parameters_to_vary: names.get(1).or(names.first()).cloned().into_iter().collect(),
            parameter_values: Default::default(),
            probing_question: "How does changing this parameter affect the outcome?".to_string(),
            display_mode: DisplayMode::Single,
            before_state: None,
            after_state: None,
        },
    ]
}

#[async_trait]
impl Step for PlanStep {
    fn name(&self) -> StepName {
        StepName::Plan
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let Some(concept) = state.current_concept().cloned() else {
            state.next_action = NextAction::Assess;
            return Ok(state);
        };

        let request = ContentRequest::PlanTakeaways {
            concept: concept.clone(),
            learner: state.learner,
            control_mode: state.control_mode,
            parameters: state.ingestion.parameters.clone(),
            count: self.takeaways_per_concept,
        };
        let raw = self.provider.generate(&request).await;
        let takeaways = match provider_outcome(raw, parse::parse_takeaways)? {
            Ok(mut t) => {
                t.truncate(self.takeaways_per_concept);
                t
            }
            Err(reason) => {
                log_content_fallback(&state.session_id, self.name(), &reason);
                let mut t = placeholder_takeaways(&concept, &state.ingestion.parameters);
                t.truncate(self.takeaways_per_concept);
                t
            }
        };
        tracing::debug!(
            session_id = %state.session_id,
            concept = %concept.name,
            takeaways = takeaways.len(),
            "planned concept"
        );

        let teaching = &mut state.teaching;
        teaching.takeaways = takeaways;
        teaching.current_takeaway_index = 0;
        teaching.re_explain_count = 0;
        teaching.understanding_status = None;
        teaching.feedback_message = None;
        state.next_action = NextAction::Teach;
        Ok(state)
    }
}
