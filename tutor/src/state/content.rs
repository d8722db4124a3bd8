//! Records that live inside the session state: learner profile, lesson content, interactions
//! and assessment items.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Learner's current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn up(self) -> Self {
        match self {
            Level::Beginner => Level::Intermediate,
            Level::Intermediate | Level::Advanced => Level::Advanced,
        }
    }

    pub fn down(self) -> Self {
        match self {
            Level::Advanced => Level::Intermediate,
            Level::Intermediate | Level::Beginner => Level::Beginner,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        };
        f.write_str(s)
    }
}

/// How quickly the learner picks things up; shapes praise and level thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Calibre {
    Dull,
    Medium,
    #[serde(rename = "High IQ")]
    HighIq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub level: Level,
    pub calibre: Calibre,
}

/// A top-level learning objective extracted from a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_importance")]
    pub importance: String,
}

fn default_importance() -> String {
    "medium".to_string()
}

/// A tunable control exposed by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameter {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

/// Parameter values keyed by parameter name.
pub type ParameterValues = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Single,
    BeforeAfter,
}

/// One teachable sub-step of a concept, tied to concrete parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Takeaway {
    #[serde(default)]
    pub id: u32,
    pub explanation: String,
    #[serde(default)]
    pub parameters_to_vary: Vec<String>,
    #[serde(default)]
    pub parameter_values: ParameterValues,
    pub probing_question: String,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub before_state: Option<ParameterValues>,
    #[serde(default)]
    pub after_state: Option<ParameterValues>,
}

/// Three-way classification of a learner answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Understanding {
    Understood,
    Partial,
    Confused,
}

impl Understanding {
    /// Lenient label parsing; anything unrecognised is `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "understood" => Some(Understanding::Understood),
            "partial" => Some(Understanding::Partial),
            "confused" => Some(Understanding::Confused),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderstandingStatus {
    pub label: Understanding,
    /// Always within `0.0..=1.0`.
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
}

impl UnderstandingStatus {
    pub fn new(label: Understanding, confidence: f32, reasoning: impl Into<String>) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label,
            confidence,
            reasoning: reasoning.into(),
        }
    }

    pub fn is_confused(&self) -> bool {
        self.label == Understanding::Confused
    }
}

/// One question/answer exchange. `understanding_status` stays `None` until classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub timestamp: String,
    pub agent_message: String,
    pub student_response: String,
    pub understanding_status: Option<UnderstandingStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    Learner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
        }
    }

    pub fn learner(content: impl Into<String>) -> Self {
        Self {
            role: Role::Learner,
            content: content.into(),
        }
    }
}

/// Multiple-choice question; `correct_answer` is a 0-based option index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mcq {
    #[serde(default)]
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Mcq {
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() >= 2
            && self.correct_answer < self.options.len()
    }

    /// Maps a learner reply to an option index: a letter (`b`, `B)`), a 1-based number,
    /// or the exact option text.
    pub fn interpret(&self, reply: &str) -> Option<usize> {
        let reply = reply.trim();
        let head = reply.trim_end_matches([')', '.', ':']).trim();
        if head.len() == 1 {
            let c = head.chars().next()?.to_ascii_uppercase();
            if c.is_ascii_uppercase() {
                let idx = (c as u8 - b'A') as usize;
                return (idx < self.options.len()).then_some(idx);
            }
        }
        if let Ok(n) = head.parse::<usize>() {
            return (n >= 1 && n <= self.options.len()).then(|| n - 1);
        }
        self.options
            .iter()
            .position(|o| o.trim().eq_ignore_ascii_case(reply))
    }

    pub fn option_letter(idx: usize) -> char {
        (b'A' + (idx.min(25) as u8)) as char
    }
}

/// A learner's reply to one MCQ. `choice` is `None` when the reply matched no option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqAnswer {
    pub mcq_id: u32,
    pub reply: String,
    pub choice: Option<usize>,
    pub correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub total: usize,
    pub correct: usize,
    pub percentage: f64,
}

impl Score {
    pub fn from_answers(total: usize, answers: &[McqAnswer]) -> Self {
        let correct = answers.iter().filter(|a| a.correct == Some(true)).count();
        let percentage = if total == 0 {
            0.0
        } else {
            (correct as f64 / total as f64) * 100.0
        };
        Self {
            total,
            correct,
            percentage,
        }
    }
}

/// Aggregates over the teaching interactions, reported with the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TeachingStats {
    pub total_interactions: usize,
    pub concepts_taught: usize,
    pub average_confidence: f32,
    pub re_explain_rate: f32,
    pub understanding_rate: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub feedback: String,
    pub recommended_next_level: Level,
    pub stats: TeachingStats,
}
