//! The twelve tutoring steps.
//!
//! Each step reads the state it is handed and returns the full successor state with a new
//! `next_action`. Provider failures split two ways through [`provider_outcome`]:
//! `Unavailable` aborts the step, unusable output is a content fallback.

mod assessment;
mod concepts;
mod feedback;
mod ingest;
mod plan;
mod probe;
mod route;
mod summary;
mod teach;
mod understanding;

use std::sync::Arc;

pub use assessment::{AssessStep, GenerateAssessmentStep};
pub use concepts::ExtractConceptsStep;
pub use feedback::FeedbackStep;
pub use ingest::{IngestStep, ParseStep};
pub use plan::PlanStep;
pub use probe::ProbeStep;
pub use route::{decide, RouteStep};
pub use summary::{recommend_level, teaching_stats, SummarizeStep};
pub use teach::TeachStep;
pub use understanding::{keyword_classify, CheckUnderstandingStep};

use crate::content::{ContentProvider, ProviderError};
use crate::engine::EngineConfig;
use crate::graph::{StepError, StepRegistry};

/// Outer `Err` aborts the step; inner `Err(reason)` asks for the step's placeholder.
pub(crate) fn provider_outcome<T>(
    raw: Result<String, ProviderError>,
    parse: impl FnOnce(&str) -> Result<T, ProviderError>,
) -> Result<Result<T, String>, StepError> {
    let text = match raw {
        Ok(text) => text,
        Err(e) if e.is_fallback() => return Ok(Err(e.to_string())),
        Err(e) => return Err(StepError::Provider(e)),
    };
    match parse(&text) {
        Ok(v) => Ok(Ok(v)),
        Err(e) if e.is_fallback() => Ok(Err(e.to_string())),
        Err(e) => Err(StepError::Provider(e)),
    }
}

/// Interaction timestamp, local time.
pub(crate) fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl StepRegistry {
    /// All twelve steps, with limits from `config` injected into their constructors.
    pub fn standard(provider: Arc<dyn ContentProvider>, config: &EngineConfig) -> Self {
        let mut registry = StepRegistry::new();
        registry
            .register(Arc::new(IngestStep))
            .register(Arc::new(ParseStep))
            .register(Arc::new(ExtractConceptsStep::new(
                provider.clone(),
                config.concepts_per_session,
            )))
            .register(Arc::new(RouteStep))
            .register(Arc::new(PlanStep::new(
                provider.clone(),
                config.takeaways_per_concept,
            )))
            .register(Arc::new(TeachStep::new(provider.clone())))
            .register(Arc::new(ProbeStep))
            .register(Arc::new(CheckUnderstandingStep::new(provider.clone())))
            .register(Arc::new(FeedbackStep::new(config.max_re_explain)))
            .register(Arc::new(GenerateAssessmentStep::new(
                provider.clone(),
                config.assessment_questions,
            )))
            .register(Arc::new(AssessStep))
            .register(Arc::new(SummarizeStep::new(provider)));
        registry
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::json;

    use crate::state::{
        Calibre, Concept, ControlMode, DisplayMode, Level, LearnerProfile, SessionState,
        Simulation, SimulationParameter, Takeaway,
    };

    /// Beginner/Medium learner on a pendulum with two controls, MANUAL mode.
    pub fn fresh_state() -> SessionState {
        SessionState::new(
            "s1",
            Simulation {
                name: "Simple Pendulum".into(),
                url: None,
                description: "A mass on a string swinging under gravity".into(),
            },
            LearnerProfile {
                level: Level::Beginner,
                calibre: Calibre::Medium,
            },
            ControlMode::Manual,
        )
        .with_parameters(vec![
            SimulationParameter {
                name: "length".into(),
                label: Some("Length".into()),
                min: Some(0.5),
                max: Some(2.0),
                default: Some(json!(1.0)),
            },
            SimulationParameter {
                name: "gravity".into(),
                label: Some("Gravity".into()),
                min: Some(1.0),
                max: Some(20.0),
                default: Some(json!(9.8)),
            },
        ])
    }

    /// `Period` first, then `Amplitude`, then numbered extras.
    pub fn pendulum_concepts(n: usize) -> Vec<Concept> {
        let known = [
            ("Period", "Time for one full swing"),
            ("Amplitude", "How far the pendulum swings from rest"),
        ];
        (0..n)
            .map(|i| {
                let (name, description) = known
                    .get(i)
                    .map(|(n, d)| (n.to_string(), d.to_string()))
                    .unwrap_or_else(|| (format!("Concept {}", i + 1), String::new()));
                Concept {
                    name,
                    description,
                    importance: "high".into(),
                }
            })
            .collect()
    }

    pub fn takeaway(explanation: &str) -> Takeaway {
        Takeaway {
            id: 1,
            explanation: explanation.into(),
            parameters_to_vary: Vec::new(),
            parameter_values: Default::default(),
            probing_question: "What did you notice?".into(),
            display_mode: DisplayMode::Single,
            before_state: None,
            after_state: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StepName;

    #[test]
    fn fallback_errors_become_reasons() {
        let r: Result<Result<u8, String>, _> =
            provider_outcome(Err(ProviderError::Empty), |_| Ok(1));
        assert!(matches!(r, Ok(Err(_))));
        let r = provider_outcome(Ok("x".into()), |_| Err::<u8, _>(ProviderError::Malformed("bad".into())));
        assert!(matches!(r, Ok(Err(_))));
        let r = provider_outcome(Ok("7".into()), |s| Ok::<u8, _>(s.parse().unwrap()));
        assert_eq!(r.unwrap(), Ok(7));
    }

    #[test]
    fn unavailable_is_a_step_error() {
        let r = provider_outcome(Err(ProviderError::Unavailable("503".into())), |_| Ok(1u8));
        assert!(matches!(r, Err(StepError::Provider(ProviderError::Unavailable(_)))));
    }

    #[test]
    fn standard_registry_has_every_step() {
        let provider = Arc::new(crate::content::MockProvider::new());
        let registry = StepRegistry::standard(provider, &EngineConfig::default());
        assert_eq!(registry.len(), StepName::ALL.len());
        for name in StepName::ALL {
            assert!(registry.contains(name), "{name} missing");
        }
    }
}
