//! Routing graph: step identity, the step trait, the registry and the transition table.
//!
//! `TransitionTable` mirrors a state graph builder (entry/edge/conditional) and compiles
//! into `CompiledTransitions`, a pure `(last_completed_step, next_action) -> Target` lookup.

mod compile_error;
pub mod logging;
mod registry;
mod step;
mod step_name;
mod transition;

pub use compile_error::CompilationError;
pub use registry::StepRegistry;
pub use step::{Step, StepError};
pub use step_name::StepName;
pub use transition::{CompiledTransitions, RoutingError, Target, TransitionTable};
