//! generate_assessment and assess: the multiple-choice phase after every concept is taught.

use std::sync::Arc;

use async_trait::async_trait;

use crate::content::{parse, ContentProvider, ContentRequest};
use crate::graph::logging::log_content_fallback;
use crate::graph::{Step, StepError, StepName};
use crate::state::{AssessmentPhase, Concept, Mcq, NextAction, Score, SessionState};

use super::provider_outcome;

/// Generates the MCQs and opens the assessment phase.
pub struct GenerateAssessmentStep {
    provider: Arc<dyn ContentProvider>,
    questions: usize,
}

impl GenerateAssessmentStep {
    pub fn new(provider: Arc<dyn ContentProvider>, questions: usize) -> Self {
        Self {
            provider,
            questions: questions.max(1),
        }
    }
}

fn placeholder_mcq(concept: &Concept) -> Mcq {
    let core = if concept.description.trim().is_empty() {
        format!("The core idea behind {}", concept.name)
    } else {
        concept.description.clone()
    };
    Mcq {
        id: 0,
        question: format!("Which of the following best describes {}?", concept.name),
        options: vec![
            core,
            "An unrelated effect of the simulation".to_string(),
            "A measurement error".to_string(),
            "None of the above".to_string(),
        ],
        correct_answer: 0,
        explanation: format!("{} is about: {}", concept.name, concept.description),
    }
}

#[async_trait]
impl Step for GenerateAssessmentStep {
    fn name(&self) -> StepName {
        StepName::GenerateAssessment
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let request = ContentRequest::GenerateMcqs {
            concepts: state.ingestion.concepts.clone(),
            learner: state.learner,
            count: self.questions,
        };
        let raw = self.provider.generate(&request).await;
        let mut mcqs = match provider_outcome(raw, parse::parse_mcqs)? {
            Ok(mut mcqs) => {
                mcqs.truncate(self.questions);
                mcqs
            }
            Err(reason) => {
                log_content_fallback(&state.session_id, self.name(), &reason);
                let mut concepts = state.ingestion.concepts.clone();
                if concepts.is_empty() {
                    let name = state.simulation_name().to_string();
                    concepts.push(Concept {
                        description: format!("Basic principles of {name} simulation"),
                        name,
                        importance: "high".to_string(),
                    });
                }
                concepts.iter().map(placeholder_mcq).collect()
            }
        };
        for (i, mcq) in mcqs.iter_mut().enumerate() {
            mcq.id = i as u32 + 1;
        }
        tracing::debug!(session_id = %state.session_id, questions = mcqs.len(), "assessment ready");

        state.say(format!(
            "You've worked through every concept. Let's check what stuck with {} quick questions.",
            mcqs.len()
        ));
        state.assessment = Some(AssessmentPhase {
            mcqs,
            ..AssessmentPhase::default()
        });
        state.next_action = NextAction::Assess;
        Ok(state)
    }
}

/// Grades recorded answers, then asks the next question or closes the assessment.
pub struct AssessStep;

fn present(mcq: &Mcq, number: usize, total: usize) -> String {
    let mut text = format!("Question {number} of {total}: {}", mcq.question);
    for (i, option) in mcq.options.iter().enumerate() {
        text.push_str(&format!("\n{}) {option}", Mcq::option_letter(i)));
    }
    text
}

#[async_trait]
impl Step for AssessStep {
    fn name(&self) -> StepName {
        StepName::Assess
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let Some(assessment) = state.assessment.as_mut() else {
            return Err(StepError::InvalidState("assessment has not been generated".into()));
        };

        let mut replies = Vec::new();
        for answer in assessment.answers.iter_mut().filter(|a| a.correct.is_none()) {
            let Some(mcq) = assessment.mcqs.iter().find(|m| m.id == answer.mcq_id) else {
                answer.correct = Some(false);
                continue;
            };
            if answer.choice.is_none() {
                answer.choice = mcq.interpret(&answer.reply);
            }
            let correct = answer.choice == Some(mcq.correct_answer);
            answer.correct = Some(correct);
            let mut reply = if correct {
                "Correct!".to_string()
            } else {
                format!(
                    "Not quite. The answer is {}) {}.",
                    Mcq::option_letter(mcq.correct_answer),
                    mcq.options[mcq.correct_answer]
                )
            };
            if !mcq.explanation.trim().is_empty() {
                reply.push(' ');
                reply.push_str(&mcq.explanation);
            }
            replies.push(reply);
        }
        assessment.current_index = assessment.answers.len().min(assessment.mcqs.len());

        let next = match assessment.mcqs.get(assessment.current_index) {
            Some(mcq) => {
                replies.push(present(mcq, assessment.current_index + 1, assessment.mcqs.len()));
                NextAction::WaitForResponse
            }
            None => {
                let score = Score::from_answers(assessment.mcqs.len(), &assessment.answers);
                replies.push(format!(
                    "You answered {} of {} correctly ({:.0}%).",
                    score.correct, score.total, score.percentage
                ));
                assessment.score = Some(score);
                NextAction::Summarize
            }
        };
        for reply in replies {
            state.say(reply);
        }
        state.next_action = next;
        Ok(state)
    }
}
