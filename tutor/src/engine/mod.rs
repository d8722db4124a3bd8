//! Workflow engine: drives steps through the transition table and checkpoints each one.

mod config;
mod locks;
mod runner;

pub use config::{ConfigError, EngineConfig};
pub use locks::SessionLocks;
pub use runner::TutorEngine;
