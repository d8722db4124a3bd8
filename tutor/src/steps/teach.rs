use std::sync::Arc;

use async_trait::async_trait;

use crate::content::{parse, ContentProvider, ContentRequest};
use crate::graph::logging::log_content_fallback;
use crate::graph::{Step, StepError, StepName};
use crate::state::{
    ControlMode, DisplayMode, NextAction, ParameterValues, SessionState, SimulationParameter,
    Takeaway,
};

use super::provider_outcome;

/// Explains the current takeaway.
///
/// MANUAL mode tells the learner which controls to move; AUTO mode applies values to
/// `active_parameters` itself (asking the provider when the takeaway names controls but no
/// values). Only `control_mode` from the state decides which.
pub struct TeachStep {
    provider: Arc<dyn ContentProvider>,
}

impl TeachStep {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }

    async fn auto_values(
        &self,
        state: &SessionState,
        takeaway: &Takeaway,
    ) -> Result<ParameterValues, StepError> {
        if !takeaway.parameter_values.is_empty() || takeaway.parameters_to_vary.is_empty() {
            return Ok(takeaway.parameter_values.clone());
        }
        let named: Vec<SimulationParameter> = state
            .ingestion
            .parameters
            .iter()
            .filter(|p| takeaway.parameters_to_vary.contains(&p.name))
            .cloned()
            .collect();
        let request = ContentRequest::SynthesizeParameters {
            concept: state.current_concept().map(|c| c.name.clone()).unwrap_or_default(),
            explanation: takeaway.explanation.clone(),
            parameters: named.clone(),
        };
        let raw = self.provider.generate(&request).await;
        match provider_outcome(raw, parse::parse_parameter_values)? {
            Ok(values) => Ok(values
                .into_iter()
                .filter(|(k, _)| takeaway.parameters_to_vary.contains(k))
                .collect()),
            Err(reason) => {
                log_content_fallback(&state.session_id, StepName::Teach, &reason);
                Ok(named
                    .into_iter()
                    .filter_map(|p| p.default.map(|d| (p.name, d)))
                    .collect())
            }
        }
    }
}

pub(crate) fn fmt_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn fmt_values(values: &ParameterValues) -> String {
    values
        .iter()
        .map(|(k, v)| format!("{k} = {}", fmt_value(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn label_of<'a>(state: &'a SessionState, name: &'a str) -> &'a str {
    state
        .ingestion
        .parameters
        .iter()
        .find(|p| p.name == name)
        .and_then(|p| p.label.as_deref())
        .unwrap_or(name)
}

fn manual_instructions(state: &SessionState, takeaway: &Takeaway) -> Option<String> {
    let mut lines = Vec::new();
    match (&takeaway.display_mode, &takeaway.before_state, &takeaway.after_state) {
        (DisplayMode::BeforeAfter, Some(before), Some(after)) => {
            lines.push(format!("First set {}, and watch closely.", fmt_values(before)));
            lines.push(format!("Then change to {} and compare.", fmt_values(after)));
        }
        _ => {
            for (name, value) in &takeaway.parameter_values {
                lines.push(format!("- Set {} to {}", label_of(state, name), fmt_value(value)));
            }
            if lines.is_empty() {
                for name in &takeaway.parameters_to_vary {
                    lines.push(format!("- Adjust {} and watch what changes", label_of(state, name)));
                }
            }
        }
    }
    (!lines.is_empty()).then(|| format!("Try this in the simulation:\n{}", lines.join("\n")))
}

#[async_trait]
impl Step for TeachStep {
    fn name(&self) -> StepName {
        StepName::Teach
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let Some(takeaway) = state.current_takeaway().cloned() else {
            tracing::debug!(session_id = %state.session_id, "takeaways exhausted, concept complete");
            state.complete_concept();
            state.next_action = NextAction::Route;
            return Ok(state);
        };

        let mut parts = Vec::new();
        if state.teaching.re_explain_count > 0 {
            if let Some(fb) = state.teaching.feedback_message.take() {
                parts.push(fb);
            }
        }
        parts.push(takeaway.explanation.clone());

        match state.control_mode {
            ControlMode::Manual => {
                if let Some(instructions) = manual_instructions(&state, &takeaway) {
                    parts.push(instructions);
                }
            }
            ControlMode::Auto => {
                let applied = match (&takeaway.display_mode, &takeaway.after_state) {
                    (DisplayMode::BeforeAfter, Some(after)) => {
                        if let Some(before) = &takeaway.before_state {
                            parts.push(format!("Before: {}", fmt_values(before)));
                        }
                        after.clone()
                    }
                    _ => self.auto_values(&state, &takeaway).await?,
                };
                if !applied.is_empty() {
                    parts.push(format!("I've set the simulation: {}", fmt_values(&applied)));
                    state.teaching.active_parameters.extend(applied);
                }
            }
        }

        state.say(parts.join("\n\n"));
        state.next_action = NextAction::Probe;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentKind, MockProvider};
    use crate::state::{ChatMessage, Role};
    use crate::steps::test_support::{fresh_state, pendulum_concepts, takeaway};
    use serde_json::json;

    fn teaching_state(mode: ControlMode, t: Takeaway) -> SessionState {
        let mut s = fresh_state().with_concepts(pendulum_concepts(1));
        s.control_mode = mode;
        s.ingestion.parameters = vec![SimulationParameter {
            name: "length".into(),
            label: Some("String length".into()),
            min: Some(0.5),
            max: Some(2.0),
            default: Some(json!(1.0)),
        }];
        s.teaching.takeaways = vec![t];
        s
    }

    fn last_message(s: &SessionState) -> &ChatMessage {
        s.messages.last().unwrap()
    }

    #[tokio::test]
    async fn manual_mode_emits_human_instructions() {
        let mut t = takeaway("Longer strings swing slower.");
        t.parameter_values.insert("length".into(), json!(2.0));
        let s = teaching_state(ControlMode::Manual, t);
        let out = TeachStep::new(Arc::new(MockProvider::new())).run(s).await.unwrap();
        let msg = last_message(&out);
        assert_eq!(msg.role, Role::Agent);
        assert!(msg.content.contains("Longer strings swing slower."));
        assert!(msg.content.contains("- Set String length to 2.0"));
        assert!(out.teaching.active_parameters.is_empty());
        assert_eq!(out.next_action, NextAction::Probe);
    }

    #[tokio::test]
    async fn auto_mode_synthesizes_and_applies_values() {
        let mock = Arc::new(
            MockProvider::new().with_default(ContentKind::Parameters, r#"{"length": 1.8, "mass": 3}"#),
        );
        let mut t = takeaway("Longer strings swing slower.");
        t.parameters_to_vary = vec!["length".into()];
        let s = teaching_state(ControlMode::Auto, t);
        let out = TeachStep::new(mock.clone()).run(s).await.unwrap();
        assert_eq!(out.teaching.active_parameters.get("length"), Some(&json!(1.8)));
        assert!(!out.teaching.active_parameters.contains_key("mass"));
        assert!(last_message(&out).content.contains("I've set the simulation: length = 1.8"));
        assert_eq!(mock.calls(ContentKind::Parameters), 1);
    }

    #[tokio::test]
    async fn auto_mode_falls_back_to_defaults() {
        let mut t = takeaway("Longer strings swing slower.");
        t.parameters_to_vary = vec!["length".into()];
        let s = teaching_state(ControlMode::Auto, t);
        let out = TeachStep::new(Arc::new(MockProvider::new())).run(s).await.unwrap();
        assert_eq!(out.teaching.active_parameters.get("length"), Some(&json!(1.0)));
    }

    #[tokio::test]
    async fn re_explain_prefixes_feedback_once() {
        let mut s = teaching_state(ControlMode::Manual, takeaway("Longer strings swing slower."));
        s.teaching.re_explain_count = 1;
        s.teaching.feedback_message = Some("Let's try a simpler way.".into());
        let out = TeachStep::new(Arc::new(MockProvider::new())).run(s).await.unwrap();
        assert!(last_message(&out).content.starts_with("Let's try a simpler way."));
        assert_eq!(out.teaching.feedback_message, None);
    }

    #[tokio::test]
    async fn exhausted_takeaways_complete_the_concept() {
        let mut s = teaching_state(ControlMode::Manual, takeaway("x"));
        s.teaching.current_takeaway_index = 1;
        let out = TeachStep::new(Arc::new(MockProvider::new())).run(s).await.unwrap();
        assert_eq!(out.next_action, NextAction::Route);
        assert_eq!(out.teaching.current_concept_index, 1);
        assert!(out.teaching.takeaways.is_empty());
    }
}
