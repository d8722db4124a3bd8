use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a registered step. Checkpoints record the last one that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    Ingest,
    Parse,
    ExtractConcepts,
    Route,
    Plan,
    Teach,
    Probe,
    CheckUnderstanding,
    Feedback,
    GenerateAssessment,
    Assess,
    Summarize,
}

impl StepName {
    pub const ALL: [StepName; 12] = [
        StepName::Ingest,
        StepName::Parse,
        StepName::ExtractConcepts,
        StepName::Route,
        StepName::Plan,
        StepName::Teach,
        StepName::Probe,
        StepName::CheckUnderstanding,
        StepName::Feedback,
        StepName::GenerateAssessment,
        StepName::Assess,
        StepName::Summarize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Ingest => "ingest",
            StepName::Parse => "parse",
            StepName::ExtractConcepts => "extract_concepts",
            StepName::Route => "route",
            StepName::Plan => "plan",
            StepName::Teach => "teach",
            StepName::Probe => "probe",
            StepName::CheckUnderstanding => "check_understanding",
            StepName::Feedback => "feedback",
            StepName::GenerateAssessment => "generate_assessment",
            StepName::Assess => "assess",
            StepName::Summarize => "summarize",
        }
    }

    /// Helper for display of an optional last step; `None` means nothing has run yet.
    pub fn label(step: Option<StepName>) -> &'static str {
        step.map(|s| s.as_str()).unwrap_or("<start>")
    }
}

impl std::str::FromStr for StepName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepName::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("unknown step: {s}"))
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
