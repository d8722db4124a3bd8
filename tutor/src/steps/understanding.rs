use std::sync::Arc;

use async_trait::async_trait;

use crate::content::{parse, ContentProvider, ContentRequest};
use crate::graph::logging::log_content_fallback;
use crate::graph::{Step, StepError, StepName};
use crate::state::{NextAction, SessionState, Understanding, UnderstandingStatus};

use super::{provider_outcome, timestamp};

const CONFUSION_PHRASES: &[&str] = &[
    "i don't know",
    "idk",
    "not sure",
    "confused",
    "don't understand",
    "can you explain",
    "what do you mean",
    "huh",
    "?",
    "i'm lost",
];

/// Substring matches, so short words like "it" also hit inside longer ones.
const ENGAGEMENT_PHRASES: &[&str] = &[
    "i see",
    "i understand",
    "makes sense",
    "got it",
    "yes",
    "the",
    "when",
    "because",
    "so",
    "it",
];

/// Classifier used when the provider output is unusable.
pub fn keyword_classify(response: &str) -> UnderstandingStatus {
    let text = response.trim().to_lowercase();
    if CONFUSION_PHRASES.iter().any(|p| text.contains(p)) {
        return UnderstandingStatus::new(Understanding::Confused, 0.6, "confusion phrase in response");
    }
    if text.chars().count() < 5 {
        return UnderstandingStatus::new(Understanding::Partial, 0.4, "response too short");
    }
    let hits = ENGAGEMENT_PHRASES.iter().filter(|p| text.contains(*p)).count();
    if hits >= 2 && text.chars().count() > 20 {
        UnderstandingStatus::new(Understanding::Understood, 0.6, "explanatory response")
    } else {
        UnderstandingStatus::new(Understanding::Partial, 0.5, "keyword heuristic")
    }
}

/// Classifies the newest unclassified interaction and hands over to feedback.
pub struct CheckUnderstandingStep {
    provider: Arc<dyn ContentProvider>,
}

impl CheckUnderstandingStep {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Step for CheckUnderstandingStep {
    fn name(&self) -> StepName {
        StepName::CheckUnderstanding
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let pending = state
            .teaching
            .interactions
            .iter()
            .rposition(|i| i.understanding_status.is_none());

        let status = match pending {
            None => {
                tracing::debug!(session_id = %state.session_id, "no pending interaction");
                keyword_classify("")
            }
            Some(idx) => {
                let interaction = &state.teaching.interactions[idx];
                let request = ContentRequest::ClassifyUnderstanding {
                    concept: state.current_concept().map(|c| c.name.clone()).unwrap_or_default(),
                    explanation: state
                        .current_takeaway()
                        .map(|t| t.explanation.clone())
                        .unwrap_or_default(),
                    question: interaction.agent_message.clone(),
                    response: interaction.student_response.clone(),
                };
                let raw = self.provider.generate(&request).await;
                match provider_outcome(raw, parse::parse_classification)? {
                    Ok(status) => status,
                    Err(reason) => {
                        log_content_fallback(&state.session_id, self.name(), &reason);
                        keyword_classify(&state.teaching.interactions[idx].student_response)
                    }
                }
            }
        };

        if let Some(idx) = pending {
            let interaction = &mut state.teaching.interactions[idx];
            interaction.understanding_status = Some(status.clone());
            if interaction.timestamp.is_empty() {
                interaction.timestamp = timestamp();
            }
        }
        tracing::debug!(
            session_id = %state.session_id,
            label = ?status.label,
            confidence = status.confidence,
            "classified understanding"
        );
        state.teaching.understanding_status = Some(status);
        state.next_action = NextAction::Feedback;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{classification_json, ContentKind, MockProvider, ProviderError};
    use crate::state::Interaction;
    use crate::steps::test_support::{fresh_state, pendulum_concepts};

    fn answered(response: &str) -> SessionState {
        let mut s = fresh_state().with_concepts(pendulum_concepts(1));
        s.teaching.interactions.push(Interaction {
            timestamp: "2024-01-01 10:00:00".into(),
            agent_message: "What happens if you double the length?".into(),
            student_response: response.into(),
            understanding_status: None,
        });
        s
    }

    #[test]
    fn keyword_thresholds() {
        assert_eq!(keyword_classify("yes").label, Understanding::Partial);
        assert_eq!(keyword_classify("yes").confidence, 0.4);
        let long = "It swings slower because the string is longer";
        assert_eq!(keyword_classify(long).label, Understanding::Understood);
        assert_eq!(keyword_classify("a bit quicker").confidence, 0.5);
    }

    /// **Scenario**: acknowledgement phrases count as engagement; questions and requests
    /// for another explanation count as confusion.
    #[test]
    fn keyword_phrases() {
        let cases = [
            ("I see, that makes sense now, got it", Understanding::Understood),
            ("idk", Understanding::Confused),
            ("can you explain that again please", Understanding::Confused),
            ("what do you mean by period", Understanding::Confused),
            ("longer string?", Understanding::Confused),
            ("I'm lost here", Understanding::Confused),
        ];
        for (response, expected) in cases {
            assert_eq!(keyword_classify(response).label, expected, "{response:?}");
        }
        assert_eq!(keyword_classify("I'm lost here").confidence, 0.6);
    }

    #[tokio::test]
    async fn provider_classification_fills_pending_interaction() {
        let mock = MockProvider::new().with_default(
            ContentKind::Classification,
            format!("```json\n{}\n```", classification_json("understood", 1.7)),
        );
        let out = CheckUnderstandingStep::new(Arc::new(mock))
            .run(answered("slower"))
            .await
            .unwrap();
        let status = out.teaching.interactions[0].understanding_status.as_ref().unwrap();
        assert_eq!(status.label, Understanding::Understood);
        assert_eq!(status.confidence, 1.0);
        assert_eq!(out.teaching.understanding_status.as_ref(), Some(status));
        assert_eq!(out.next_action, NextAction::Feedback);
    }

    #[tokio::test]
    async fn malformed_output_uses_keyword_classifier() {
        let mock = MockProvider::new().with_default(ContentKind::Classification, "   ");
        let out = CheckUnderstandingStep::new(Arc::new(mock))
            .run(answered("I'm not sure at all"))
            .await
            .unwrap();
        let status = out.teaching.understanding_status.unwrap();
        assert_eq!(status.label, Understanding::Confused);
        assert_eq!(status.confidence, 0.6);
    }

    #[tokio::test]
    async fn unavailable_provider_leaves_interaction_pending() {
        let mock = MockProvider::new().with_default_failure(
            ContentKind::Classification,
            ProviderError::Unavailable("timeout".into()),
        );
        let err = CheckUnderstandingStep::new(Arc::new(mock))
            .run(answered("slower"))
            .await
            .unwrap_err();
        assert!(matches!(err, StepError::Provider(ProviderError::Unavailable(_))));
    }

    #[tokio::test]
    async fn only_the_unclassified_interaction_is_touched() {
        let mut s = answered("first");
        s.teaching.interactions[0].understanding_status =
            Some(UnderstandingStatus::new(Understanding::Confused, 0.8, ""));
        s.teaching.interactions.push(Interaction {
            timestamp: String::new(),
            agent_message: "Try again?".into(),
            student_response: "second".into(),
            understanding_status: None,
        });
        let out = CheckUnderstandingStep::new(Arc::new(MockProvider::classifying("partial")))
            .run(s)
            .await
            .unwrap();
        let i = &out.teaching.interactions;
        assert_eq!(i[0].understanding_status.as_ref().unwrap().label, Understanding::Confused);
        assert_eq!(i[1].understanding_status.as_ref().unwrap().label, Understanding::Partial);
        assert!(!i[1].timestamp.is_empty());
    }

    /// **Scenario**: with two unclassified interactions, the most recent answer is the one
    /// classified; the older one stays pending.
    #[tokio::test]
    async fn newest_pending_interaction_is_classified() {
        let mut s = answered("older answer");
        s.teaching.interactions.push(Interaction {
            timestamp: String::new(),
            agent_message: "And now?".into(),
            student_response: "newer answer".into(),
            understanding_status: None,
        });
        let out = CheckUnderstandingStep::new(Arc::new(MockProvider::classifying("understood")))
            .run(s)
            .await
            .unwrap();
        let i = &out.teaching.interactions;
        assert!(i[0].understanding_status.is_none());
        assert_eq!(i[1].understanding_status.as_ref().unwrap().label, Understanding::Understood);
    }
}
