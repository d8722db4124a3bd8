use std::sync::Arc;

use async_trait::async_trait;

use crate::content::{parse, ContentProvider, ContentRequest};
use crate::graph::logging::log_content_fallback;
use crate::graph::{Step, StepError, StepName};
use crate::state::{
    Calibre, Interaction, LearnerProfile, Level, NextAction, Score, SessionState, SessionSummary,
    TeachingStats, Understanding,
};

/// Aggregates over classified interactions. Rates are fractions in `0.0..=1.0`.
pub fn teaching_stats(interactions: &[Interaction], concepts_taught: usize) -> TeachingStats {
    let statuses: Vec<_> = interactions
        .iter()
        .filter_map(|i| i.understanding_status.as_ref())
        .collect();
    let rate = |label: Understanding| {
        if statuses.is_empty() {
            0.0
        } else {
            statuses.iter().filter(|s| s.label == label).count() as f32 / statuses.len() as f32
        }
    };
    let average_confidence = if statuses.is_empty() {
        0.0
    } else {
        statuses.iter().map(|s| s.confidence).sum::<f32>() / statuses.len() as f32
    };
    TeachingStats {
        total_interactions: interactions.len(),
        concepts_taught,
        average_confidence,
        re_explain_rate: rate(Understanding::Confused),
        understanding_rate: rate(Understanding::Understood),
    }
}

/// One level up at or above the first threshold, same level at or above the second,
/// one level down below it.
pub fn recommend_level(learner: LearnerProfile, percentage: f64) -> Level {
    let (up, stay) = match learner.calibre {
        Calibre::HighIq => (85.0, 60.0),
        Calibre::Medium => (75.0, 50.0),
        Calibre::Dull => (65.0, 40.0),
    };
    if percentage >= up {
        learner.level.up()
    } else if percentage >= stay {
        learner.level
    } else {
        learner.level.down()
    }
}

fn banded_feedback(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "Outstanding work! You've mastered these concepts."
    } else if percentage >= 70.0 {
        "Good job! You have a solid grasp of the main ideas."
    } else if percentage >= 50.0 {
        "Nice effort. You understand the basics, and a bit more practice will help."
    } else {
        "Keep practicing! It's worth revisiting these concepts with the simulation."
    }
}

/// Writes the session summary and finishes the session.
pub struct SummarizeStep {
    provider: Arc<dyn ContentProvider>,
}

impl SummarizeStep {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Step for SummarizeStep {
    fn name(&self) -> StepName {
        StepName::Summarize
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let Some(assessment) = state.assessment.as_ref() else {
            return Err(StepError::InvalidState("nothing to summarize before assessment".into()));
        };
        let score = assessment
            .score
            .clone()
            .unwrap_or_else(|| Score::from_answers(assessment.mcqs.len(), &assessment.answers));
        let taught = state
            .teaching
            .current_concept_index
            .min(state.ingestion.concepts.len());
        let stats = teaching_stats(&state.teaching.interactions, taught);
        let level = recommend_level(state.learner, score.percentage);

        let request = ContentRequest::Summarize {
            learner: state.learner,
            concepts: state.ingestion.concepts.iter().map(|c| c.name.clone()).collect(),
            score: score.clone(),
            stats: stats.clone(),
        };
        let raw = self.provider.generate(&request).await;
        let feedback = match super::provider_outcome(raw, parse::parse_text)? {
            Ok(text) => text,
            Err(reason) => {
                log_content_fallback(&state.session_id, self.name(), &reason);
                banded_feedback(score.percentage).to_string()
            }
        };

        state.say(format!(
            "{feedback}\n\nScore: {}/{} ({:.0}%)\nRecommended next level: {level}",
            score.correct, score.total, score.percentage
        ));
        if let Some(assessment) = state.assessment.as_mut() {
            assessment.score = Some(score);
            assessment.summary = Some(SessionSummary {
                feedback,
                recommended_next_level: level,
                stats,
            });
        }
        state.next_action = NextAction::Done;
        Ok(state)
    }
}
