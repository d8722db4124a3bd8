//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tutor::content::ContentKind;
use tutor::{
    Calibre, Checkpointer, ControlMode, EngineConfig, LearnerProfile, Level, MemorySaver,
    MockProvider, NextAction, SessionState, Simulation, SimulationParameter, StepName,
    TutorEngine,
};

pub fn pendulum(session_id: &str, concepts: &[&str]) -> SessionState {
    SessionState::new(
        session_id,
        Simulation {
            name: "Simple Pendulum".into(),
            url: Some("https://example.org/pendulum.html".into()),
            description: "A mass on a string swinging under gravity".into(),
        },
        LearnerProfile {
            level: Level::Beginner,
            calibre: Calibre::Medium,
        },
        ControlMode::Manual,
    )
    .with_parameters(vec![SimulationParameter {
        name: "length".into(),
        label: Some("Length".into()),
        min: Some(0.5),
        max: Some(2.0),
        default: Some(serde_json::json!(1.0)),
    }])
    .with_concepts(
        concepts
            .iter()
            .map(|name| tutor::state::Concept {
                name: name.to_string(),
                description: format!("What {name} means for a pendulum"),
                importance: "high".into(),
            })
            .collect(),
    )
}

/// One takeaway per concept, two assessment questions.
pub fn small_config() -> EngineConfig {
    EngineConfig {
        takeaways_per_concept: 1,
        assessment_questions: 2,
        ..EngineConfig::default()
    }
}

/// Two valid MCQs whose correct answer is always `A`.
pub const TWO_MCQS: &str = r#"{"questions":[
    {"question":"What sets a pendulum's period?","options":["Its length","Its colour","Its mass","Nothing"],"correct_answer":0,"explanation":"Period grows with length."},
    {"question":"Which swing is wider?","options":["Larger amplitude","Smaller amplitude"],"correct_answer":0}
]}"#;

pub fn provider(label: &str) -> Arc<MockProvider> {
    Arc::new(MockProvider::classifying(label).with_default(ContentKind::Mcqs, TWO_MCQS))
}

pub struct Harness {
    pub engine: Arc<TutorEngine>,
    pub store: Arc<MemorySaver<SessionState>>,
    pub provider: Arc<MockProvider>,
}

pub fn harness(provider: Arc<MockProvider>, config: EngineConfig) -> Harness {
    let store = Arc::new(MemorySaver::<SessionState>::new());
    let engine = TutorEngine::new(store.clone(), provider.clone(), config).expect("engine compiles");
    Harness {
        engine: Arc::new(engine),
        store,
        provider,
    }
}

/// Every successful call must leave the session at a halt point.
pub async fn assert_halted(store: &MemorySaver<SessionState>, session_id: &str) {
    let cp = store
        .get(session_id)
        .await
        .expect("store readable")
        .expect("checkpoint present");
    let at = (cp.last_completed_step, cp.state.next_action);
    assert!(
        matches!(
            at,
            (Some(StepName::Probe), NextAction::WaitForResponse)
                | (Some(StepName::Assess), NextAction::WaitForResponse)
                | (Some(StepName::Summarize), NextAction::Done)
        ),
        "not a halt point: {at:?}"
    );
}
