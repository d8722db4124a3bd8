//! Session state and the records it carries.

mod content;
mod next_action;
mod session;

pub use content::{
    Calibre, ChatMessage, Concept, DisplayMode, Interaction, LearnerProfile, Level, Mcq,
    McqAnswer, ParameterValues, Role, Score, SessionSummary, SimulationParameter, Takeaway,
    TeachingStats, Understanding, UnderstandingStatus,
};
pub use next_action::{ControlMode, NextAction};
pub use session::{AssessmentPhase, IngestionPhase, SessionState, Simulation, TeachingPhase};
