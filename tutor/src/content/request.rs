use serde::Serialize;

use crate::state::{Concept, ControlMode, LearnerProfile, Score, SimulationParameter, TeachingStats};

/// What a request asks for; used by mocks to script responses per call kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Concepts,
    Takeaways,
    Parameters,
    Classification,
    Mcqs,
    Summary,
}

/// A structured prompt payload.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentRequest {
    ExtractConcepts {
        simulation: String,
        description: String,
        parameters: Vec<String>,
        max_concepts: usize,
    },
    PlanTakeaways {
        concept: Concept,
        learner: LearnerProfile,
        control_mode: ControlMode,
        parameters: Vec<SimulationParameter>,
        count: usize,
    },
    SynthesizeParameters {
        concept: String,
        explanation: String,
        parameters: Vec<SimulationParameter>,
    },
    ClassifyUnderstanding {
        concept: String,
        explanation: String,
        question: String,
        response: String,
    },
    GenerateMcqs {
        concepts: Vec<Concept>,
        learner: LearnerProfile,
        count: usize,
    },
    Summarize {
        learner: LearnerProfile,
        concepts: Vec<String>,
        score: Score,
        stats: TeachingStats,
    },
}

pub(crate) const SYSTEM_PROMPT: &str = "You are a patient science tutor working alongside an \
interactive simulation. Answer with JSON only, no prose and no code fences, unless asked for plain text.";

impl ContentRequest {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRequest::ExtractConcepts { .. } => ContentKind::Concepts,
            ContentRequest::PlanTakeaways { .. } => ContentKind::Takeaways,
            ContentRequest::SynthesizeParameters { .. } => ContentKind::Parameters,
            ContentRequest::ClassifyUnderstanding { .. } => ContentKind::Classification,
            ContentRequest::GenerateMcqs { .. } => ContentKind::Mcqs,
            ContentRequest::Summarize { .. } => ContentKind::Summary,
        }
    }

    /// User prompt text for LLM-backed providers.
    pub fn prompt(&self) -> String {
        match self {
            ContentRequest::ExtractConcepts {
                simulation,
                description,
                parameters,
                max_concepts,
            } => format!(
                "Simulation: {simulation}\nDescription: {description}\nControls: {}\n\n\
                 List the {max_concepts} most important concepts a learner should take away from this simulation.\n\
                 Respond as {{\"concepts\": [{{\"name\": str, \"description\": str, \"importance\": \"high\"|\"medium\"|\"low\"}}]}}.",
                join_or_none(parameters)
            ),
            ContentRequest::PlanTakeaways {
                concept,
                learner,
                control_mode,
                parameters,
                count,
            } => format!(
                "Concept: {} ({})\nLearner level: {}, calibre: {:?}\nControl mode: {:?}\nControls: {}\n\n\
                 Plan {count} takeaways that build the concept step by step. Each takeaway varies simulation controls.\n\
                 Respond as {{\"takeaways\": [{{\"id\": int, \"explanation\": str, \"parameters_to_vary\": [str], \
                 \"parameter_values\": {{name: value}}, \"display_mode\": \"single\"|\"before_after\", \
                 \"before_state\": {{}}|null, \"after_state\": {{}}|null, \"probing_question\": str}}]}}.",
                concept.name,
                concept.description,
                learner.level,
                learner.calibre,
                control_mode,
                describe_parameters(parameters),
                count = count,
            ),
            ContentRequest::SynthesizeParameters {
                concept,
                explanation,
                parameters,
            } => format!(
                "Concept: {concept}\nExplanation to illustrate: {explanation}\nControls: {}\n\n\
                 Choose values for these controls that make the explanation visible in the simulation.\n\
                 Respond as {{\"parameter_values\": {{name: value}}}}.",
                describe_parameters(parameters)
            ),
            ContentRequest::ClassifyUnderstanding {
                concept,
                explanation,
                question,
                response,
            } => format!(
                "Concept: {concept}\nWhat was taught: {explanation}\nQuestion asked: {question}\n\
                 Learner answer: {response}\n\n\
                 Classify the learner's understanding.\n\
                 Respond as {{\"understanding\": \"understood\"|\"partial\"|\"confused\", \"confidence\": 0.0-1.0, \"reasoning\": str}}."
            ),
            ContentRequest::GenerateMcqs {
                concepts,
                learner,
                count,
            } => format!(
                "Concepts taught: {}\nLearner level: {}\n\n\
                 Write {count} multiple-choice questions covering these concepts, four options each.\n\
                 Respond as {{\"mcqs\": [{{\"id\": int, \"question\": str, \"options\": [str], \
                 \"correct_answer\": 0-based int, \"explanation\": str}}]}}.",
                concepts
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                learner.level,
            ),
            ContentRequest::Summarize {
                learner,
                concepts,
                score,
                stats,
            } => format!(
                "Learner level: {}\nConcepts: {}\nQuiz: {}/{} ({:.0}%)\nInteractions: {}, understanding rate {:.0}%\n\n\
                 Write two or three encouraging sentences of plain text summarising the session and what to review next.",
                learner.level,
                concepts.join(", "),
                score.correct,
                score.total,
                score.percentage,
                stats.total_interactions,
                stats.understanding_rate * 100.0,
            ),
        }
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn describe_parameters(parameters: &[SimulationParameter]) -> String {
    if parameters.is_empty() {
        return "none".to_string();
    }
    parameters
        .iter()
        .map(|p| match (p.min, p.max) {
            (Some(lo), Some(hi)) => format!("{} [{lo}..{hi}]", p.name),
            _ => p.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
