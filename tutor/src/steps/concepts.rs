use std::sync::Arc;

use async_trait::async_trait;

use crate::content::{parse, ContentProvider, ContentRequest};
use crate::graph::logging::log_content_fallback;
use crate::graph::{Step, StepError, StepName};
use crate::state::{Concept, NextAction, SessionState};

use super::provider_outcome;

/// Fills `ingestion.concepts` once. Concepts supplied by the initializer are kept as-is.
pub struct ExtractConceptsStep {
    provider: Arc<dyn ContentProvider>,
    max_concepts: usize,
}

impl ExtractConceptsStep {
    pub fn new(provider: Arc<dyn ContentProvider>, max_concepts: usize) -> Self {
        Self {
            provider,
            max_concepts: max_concepts.max(1),
        }
    }
}

fn placeholder_concept(simulation: &str) -> Concept {
    Concept {
        name: format!("Understanding {simulation}"),
        description: format!("Basic principles of {simulation} simulation"),
        importance: "high".to_string(),
    }
}

#[async_trait]
impl Step for ExtractConceptsStep {
    fn name(&self) -> StepName {
        StepName::ExtractConcepts
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        state.next_action = NextAction::Route;
        if !state.ingestion.concepts.is_empty() {
            tracing::debug!(
                session_id = %state.session_id,
                count = state.ingestion.concepts.len(),
                "concepts supplied by initializer"
            );
            return Ok(state);
        }

        let simulation = state.simulation_name().to_string();
        let request = ContentRequest::ExtractConcepts {
            simulation: simulation.clone(),
            description: state
                .ingestion
                .simulation
                .as_ref()
                .map(|s| s.description.clone())
                .unwrap_or_default(),
            parameters: state.ingestion.parameters.iter().map(|p| p.name.clone()).collect(),
            max_concepts: self.max_concepts,
        };
        let raw = self.provider.generate(&request).await;
        let concepts = match provider_outcome(raw, parse::parse_concepts)? {
            Ok(mut concepts) => {
                concepts.truncate(self.max_concepts);
                concepts
            }
            Err(reason) => {
                log_content_fallback(&state.session_id, self.name(), &reason);
                vec![placeholder_concept(&simulation)]
            }
        };
        state.ingestion.concepts = concepts;
        state.teaching.current_concept_index = 0;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentKind, MockProvider, ProviderError};
    use crate::steps::test_support::fresh_state;

    #[tokio::test]
    async fn truncates_provider_concepts() {
        let mock = MockProvider::new().with_default(
            ContentKind::Concepts,
            r#"{"concepts":[{"name":"A"},{"name":"B"},{"name":"C"}]}"#,
        );
        let step = ExtractConceptsStep::new(Arc::new(mock), 2);
        let out = step.run(fresh_state()).await.unwrap();
        let names: Vec<_> = out.ingestion.concepts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn malformed_output_falls_back_to_placeholder() {
        let step = ExtractConceptsStep::new(Arc::new(MockProvider::new()), 3);
        let out = step.run(fresh_state()).await.unwrap();
        assert_eq!(out.ingestion.concepts.len(), 1);
        assert_eq!(out.ingestion.concepts[0].name, "Understanding Simple Pendulum");
        assert_eq!(out.next_action, NextAction::Route);
    }

    #[tokio::test]
    async fn unavailable_provider_is_step_error() {
        let mock = MockProvider::new()
            .with_default_failure(ContentKind::Concepts, ProviderError::Unavailable("503".into()));
        let step = ExtractConceptsStep::new(Arc::new(mock), 3);
        let err = step.run(fresh_state()).await.unwrap_err();
        assert!(matches!(err, StepError::Provider(ProviderError::Unavailable(_))));
    }

    #[tokio::test]
    async fn supplied_concepts_skip_the_provider() {
        let mock = Arc::new(MockProvider::new());
        let step = ExtractConceptsStep::new(mock.clone(), 3);
        let state = fresh_state().with_concepts(vec![Concept {
            name: "Period".into(),
            description: String::new(),
            importance: "high".into(),
        }]);
        let out = step.run(state).await.unwrap();
        assert_eq!(out.ingestion.concepts[0].name, "Period");
        assert_eq!(mock.calls(ContentKind::Concepts), 0);
    }
}
