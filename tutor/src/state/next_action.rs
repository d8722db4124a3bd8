//! The routing field and the AUTO/MANUAL control flag.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the session should do next; the only input the transition table reads besides the
/// last completed step.
///
/// Steps write it, the transition table reads it, and only the resume adapter may rewrite
/// `WaitForResponse` into something runnable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    /// Fresh session; nothing has run yet.
    Start,
    Plan,
    Teach,
    Probe,
    /// Halted awaiting learner input.
    WaitForResponse,
    CheckUnderstanding,
    Feedback,
    Route,
    ReExplain,
    Assess,
    Summarize,
    /// Session complete.
    Done,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAction::Start => "start",
            NextAction::Plan => "plan",
            NextAction::Teach => "teach",
            NextAction::Probe => "probe",
            NextAction::WaitForResponse => "wait_for_response",
            NextAction::CheckUnderstanding => "check_understanding",
            NextAction::Feedback => "feedback",
            NextAction::Route => "route",
            NextAction::ReExplain => "re_explain",
            NextAction::Assess => "assess",
            NextAction::Summarize => "summarize",
            NextAction::Done => "done",
        }
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How teaching steps talk about simulation parameters.
///
/// `Manual`: the learner moves the controls, so steps emit human instructions.
/// `Auto`: the host applies parameter values, so steps emit machine-actionable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlMode {
    Auto,
    #[default]
    Manual,
}

impl std::str::FromStr for ControlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ControlMode::Auto),
            "manual" => Ok(ControlMode::Manual),
            other => Err(format!("unknown control mode: {other}")),
        }
    }
}
