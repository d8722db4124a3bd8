//! Session state: one record per learner session, threaded through every step.
//!
//! Fields are grouped by phase so a step only reaches into the part it owns:
//! `ingestion` is written by ingest/parse/extract_concepts, `teaching` by the
//! plan/teach/probe/check_understanding/feedback loop, and `assessment` exists only once
//! the assessment phase has begun.

use serde::{Deserialize, Serialize};

use super::content::{
    ChatMessage, Concept, Interaction, LearnerProfile, Mcq, McqAnswer, ParameterValues, Role,
    Score, SessionSummary, SimulationParameter, Takeaway, UnderstandingStatus,
};
use super::next_action::{ControlMode, NextAction};

/// Identity of the simulation being taught.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IngestionPhase {
    pub simulation: Option<Simulation>,
    #[serde(default)]
    pub parameters: Vec<SimulationParameter>,
    /// Written once by extract_concepts (or supplied by the initializer).
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeachingPhase {
    /// `0..=concepts.len()`; equal to the length once every concept is taught.
    pub current_concept_index: usize,
    /// Takeaways for the current concept only.
    #[serde(default)]
    pub takeaways: Vec<Takeaway>,
    pub current_takeaway_index: usize,
    /// Append-only.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub understanding_status: Option<UnderstandingStatus>,
    /// Non-understood outcomes on the current takeaway.
    #[serde(default)]
    pub re_explain_count: u32,
    /// Parameter values currently applied to the simulation.
    #[serde(default)]
    pub active_parameters: ParameterValues,
    /// Last feedback text; teach prefixes it when re-explaining.
    #[serde(default)]
    pub feedback_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssessmentPhase {
    pub mcqs: Vec<Mcq>,
    #[serde(default)]
    pub answers: Vec<McqAnswer>,
    /// Index of the MCQ currently presented (or next to present).
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub summary: Option<SessionSummary>,
}

/// The versioned record the engine checkpoints after every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub learner: LearnerProfile,
    #[serde(default)]
    pub control_mode: ControlMode,
    pub next_action: NextAction,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub ingestion: IngestionPhase,
    #[serde(default)]
    pub teaching: TeachingPhase,
    #[serde(default)]
    pub assessment: Option<AssessmentPhase>,
}

impl SessionState {
    /// Fresh session for `simulation`, ready for `TutorEngine::start`.
    pub fn new(
        session_id: impl Into<String>,
        simulation: Simulation,
        learner: LearnerProfile,
        control_mode: ControlMode,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            learner,
            control_mode,
            next_action: NextAction::Start,
            messages: Vec::new(),
            ingestion: IngestionPhase {
                simulation: Some(simulation),
                ..IngestionPhase::default()
            },
            teaching: TeachingPhase::default(),
            assessment: None,
        }
    }

    /// Declares the simulation's controls (normally produced by an HTML scanner upstream).
    pub fn with_parameters(mut self, parameters: Vec<SimulationParameter>) -> Self {
        self.ingestion.parameters = parameters;
        self
    }

    /// Pre-extracted concepts; extract_concepts keeps them instead of asking the provider.
    pub fn with_concepts(mut self, concepts: Vec<Concept>) -> Self {
        self.ingestion.concepts = concepts;
        self
    }

    pub fn simulation_name(&self) -> &str {
        self.ingestion
            .simulation
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or_default()
    }

    pub fn current_concept(&self) -> Option<&Concept> {
        self.ingestion
            .concepts
            .get(self.teaching.current_concept_index)
    }

    pub fn current_takeaway(&self) -> Option<&Takeaway> {
        self.teaching
            .takeaways
            .get(self.teaching.current_takeaway_index)
    }

    pub fn all_concepts_taught(&self) -> bool {
        self.teaching.current_concept_index >= self.ingestion.concepts.len()
    }

    pub fn say(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::agent(content));
    }

    /// Most recent message the tutor sent.
    pub fn last_agent_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Agent)
            .map(|m| m.content.as_str())
    }

    /// Moves to the next concept: index advances, per-concept progress resets.
    pub fn complete_concept(&mut self) {
        let t = &mut self.teaching;
        t.current_concept_index = (t.current_concept_index + 1).min(self.ingestion.concepts.len());
        t.takeaways.clear();
        t.current_takeaway_index = 0;
        t.re_explain_count = 0;
        t.understanding_status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Calibre, Level};

    fn state() -> SessionState {
        SessionState::new(
            "s1",
            Simulation {
                name: "Simple Pendulum".into(),
                url: None,
                description: String::new(),
            },
            LearnerProfile {
                level: Level::Beginner,
                calibre: Calibre::Medium,
            },
            ControlMode::Manual,
        )
        .with_concepts(vec![Concept {
            name: "Period".into(),
            description: "Time for one swing".into(),
            importance: "high".into(),
        }])
    }

    #[test]
    fn new_session_starts_fresh() {
        let s = state();
        assert_eq!(s.next_action, NextAction::Start);
        assert_eq!(s.simulation_name(), "Simple Pendulum");
        assert!(s.assessment.is_none());
        assert!(!s.all_concepts_taught());
    }

    #[test]
    fn complete_concept_never_passes_concept_count() {
        let mut s = state();
        s.teaching.current_takeaway_index = 1;
        s.teaching.re_explain_count = 2;
        s.complete_concept();
        s.complete_concept();
        assert_eq!(s.teaching.current_concept_index, 1);
        assert_eq!(s.teaching.current_takeaway_index, 0);
        assert_eq!(s.teaching.re_explain_count, 0);
        assert!(s.all_concepts_taught());
    }

    #[test]
    fn last_agent_message_skips_learner_lines() {
        let mut s = state();
        s.say("What do you notice?");
        s.messages.push(ChatMessage::learner("it swings"));
        assert_eq!(s.last_agent_message(), Some("What do you notice?"));
    }
}
