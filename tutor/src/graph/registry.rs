use std::collections::HashMap;
use std::sync::Arc;

use super::{Step, StepName};

/// The set of executable steps, keyed by name.
///
/// **Interaction**: Built by `StepRegistry::standard` (or by hand in tests), validated
/// against the `TransitionTable` at compile time, then owned by `TutorEngine`.
#[derive(Default, Clone)]
pub struct StepRegistry {
    steps: HashMap<StepName, Arc<dyn Step>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step under its own name, replacing any step already registered there.
    pub fn register(&mut self, step: Arc<dyn Step>) -> &mut Self {
        self.steps.insert(step.name(), step);
        self
    }

    pub fn get(&self, name: StepName) -> Option<Arc<dyn Step>> {
        self.steps.get(&name).cloned()
    }

    pub fn contains(&self, name: StepName) -> bool {
        self.steps.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.steps.keys().copied().collect();
        names.sort();
        f.debug_struct("StepRegistry").field("steps", &names).finish()
    }
}
