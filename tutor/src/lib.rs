//! # Tutor
//!
//! A resumable, checkpointed tutoring workflow engine. A session walks a learner through the
//! concepts of an interactive simulation (ingest, plan, teach, probe, classify, give feedback),
//! then assesses them with multiple-choice questions and writes a summary.
//!
//! ## Design
//!
//! - **One state record**: every step takes the [`SessionState`] and returns its successor,
//!   including the [`NextAction`] it chose.
//! - **Data-carried routing**: a [`TransitionTable`] maps `(last completed step, next_action)`
//!   to the next step or a halt. Steps never call each other.
//! - **Checkpoint per step**: [`TutorEngine`] writes a versioned [`Checkpoint`] after every
//!   completed step, so a crash or a provider outage loses at most the step in flight.
//! - **Halts for input**: a run stops at `wait_for_response`; [`TutorEngine::resume`] records
//!   the learner's answer through the [`ResumeAdapter`] and continues.
//!
//! ## Main modules
//!
//! - [`engine`]: [`TutorEngine`], [`EngineConfig`], per-session locking.
//! - [`graph`]: [`StepName`], [`Step`], [`StepRegistry`], [`TransitionTable`], logging helpers.
//! - [`steps`]: the twelve tutoring steps.
//! - [`state`]: [`SessionState`] and its phase records.
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`SqliteSaver`].
//! - [`content`]: [`ContentProvider`], [`MockProvider`], [`OpenAiProvider`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tutor::{
//!     Calibre, ControlMode, EngineConfig, LearnerProfile, Level, MemorySaver, MockProvider,
//!     SessionState, Simulation, TutorEngine,
//! };
//!
//! # async fn demo() -> Result<(), tutor::EngineError> {
//! let engine = TutorEngine::new(
//!     Arc::new(MemorySaver::<SessionState>::new()),
//!     Arc::new(MockProvider::classifying("understood")),
//!     EngineConfig::default(),
//! )?;
//! let initial = SessionState::new(
//!     "s1",
//!     Simulation { name: "Simple Pendulum".into(), url: None, description: String::new() },
//!     LearnerProfile { level: Level::Beginner, calibre: Calibre::Medium },
//!     ControlMode::Manual,
//! );
//! let state = engine.start("s1", initial).await?;
//! println!("{}", state.last_agent_message().unwrap_or_default());
//! let state = engine.resume("s1", "It swings slower because the string is longer").await?;
//! # let _ = state;
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod engine;
pub mod error;
pub mod graph;
pub mod memory;
pub mod resume;
pub mod state;
pub mod steps;

pub use content::{ContentProvider, MockProvider, OpenAiProvider, ProviderError};
pub use engine::{ConfigError, EngineConfig, TutorEngine};
pub use error::EngineError;
pub use graph::{
    CompilationError, RoutingError, Step, StepError, StepName, StepRegistry, Target,
    TransitionTable,
};
pub use memory::{Checkpoint, CheckpointError, Checkpointer, JsonSerializer, MemorySaver, SqliteSaver};
pub use resume::{ResumeAdapter, Resumed};
pub use state::{
    AssessmentPhase, Calibre, ControlMode, Interaction, LearnerProfile, Level, Mcq, NextAction,
    SessionState, Simulation, SimulationParameter, Understanding, UnderstandingStatus,
};

/// When running `cargo test -p tutor`, initializes tracing from `RUST_LOG` so unit tests can
/// print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
