//! Transition table: static edges plus conditional edges keyed by `next_action`.
//!
//! Built like a state graph (`edge`, `conditional`, `entry`), then compiled against a
//! `StepRegistry`. The compiled form answers exactly one question, with no side effects:
//! given the last completed step and the current `next_action`, which step runs next, or
//! does the run halt?

use std::collections::HashMap;
use std::fmt;

use crate::state::NextAction;

use super::{CompilationError, StepName, StepRegistry};

/// Result of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Step(StepName),
    /// Stop the run and return the state to the caller.
    Halt,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Step(s) => write!(f, "{s}"),
            Target::Halt => f.write_str("HALT"),
        }
    }
}

/// No entry for `(step, next_action)`: a step produced an undocumented routing value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no transition from {} on next_action={next_action}", StepName::label(*.step))]
pub struct RoutingError {
    /// Last completed step; `None` for a session that has not run yet.
    pub step: Option<StepName>,
    pub next_action: NextAction,
}

#[derive(Debug, Clone)]
enum Outgoing {
    Edge(Target),
    Branches(HashMap<NextAction, Target>),
}

/// Builder for the routing graph.
#[derive(Debug, Default, Clone)]
pub struct TransitionTable {
    entry: Vec<(NextAction, StepName)>,
    edges: Vec<(StepName, Target)>,
    conditionals: Vec<(StepName, Vec<(NextAction, Target)>)>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where a fresh session (no completed step) goes when it carries `on`.
    pub fn entry(&mut self, on: NextAction, to: StepName) -> &mut Self {
        self.entry.push((on, to));
        self
    }

    /// Unconditional edge: `next_action` is ignored after `from`.
    pub fn edge(&mut self, from: StepName, to: Target) -> &mut Self {
        self.edges.push((from, to));
        self
    }

    /// Conditional edges after `from`, selected by `next_action`.
    pub fn conditional(
        &mut self,
        from: StepName,
        branches: impl IntoIterator<Item = (NextAction, Target)>,
    ) -> &mut Self {
        self.conditionals.push((from, branches.into_iter().collect()));
        self
    }

    /// The tutoring graph.
    pub fn tutoring() -> Self {
        use NextAction as A;
        use StepName as S;
        use Target::{Halt, Step};

        let mut t = Self::new();
        t.entry(A::Start, S::Ingest)
            .edge(S::Ingest, Step(S::Parse))
            .edge(S::Parse, Step(S::ExtractConcepts))
            .edge(S::ExtractConcepts, Step(S::Route))
            .conditional(
                S::Route,
                [
                    (A::Plan, Step(S::Plan)),
                    (A::Assess, Step(S::GenerateAssessment)),
                    (A::ReExplain, Step(S::Teach)),
                ],
            )
            .conditional(
                S::Plan,
                [
                    (A::Teach, Step(S::Teach)),
                    (A::Assess, Step(S::GenerateAssessment)),
                ],
            )
            .conditional(
                S::Teach,
                [(A::Probe, Step(S::Probe)), (A::Route, Step(S::Route))],
            )
            .conditional(
                S::Probe,
                [
                    (A::WaitForResponse, Halt),
                    (A::CheckUnderstanding, Step(S::CheckUnderstanding)),
                ],
            )
            .edge(S::CheckUnderstanding, Step(S::Feedback))
            .conditional(
                S::Feedback,
                [
                    (A::Teach, Step(S::Teach)),
                    (A::Probe, Step(S::Probe)),
                    (A::Route, Step(S::Route)),
                ],
            )
            .edge(S::GenerateAssessment, Step(S::Assess))
            .conditional(
                S::Assess,
                [
                    (A::WaitForResponse, Halt),
                    (A::Assess, Step(S::Assess)),
                    (A::Summarize, Step(S::Summarize)),
                ],
            )
            .conditional(S::Summarize, [(A::Done, Halt)]);
        t
    }

    /// Validates the table against `registry` and freezes it for lookup.
    pub fn compile(&self, registry: &StepRegistry) -> Result<CompiledTransitions, CompilationError> {
        if self.entry.is_empty() {
            return Err(CompilationError::MissingEntry);
        }
        let require = |step: StepName| {
            if registry.contains(step) {
                Ok(())
            } else {
                Err(CompilationError::StepNotRegistered(step))
            }
        };
        let require_target = |target: Target| match target {
            Target::Step(s) => require(s),
            Target::Halt => Ok(()),
        };

        let mut entry = HashMap::new();
        for &(on, to) in &self.entry {
            require(to)?;
            entry.insert(on, to);
        }

        let mut outgoing: HashMap<StepName, Outgoing> = HashMap::new();
        for &(from, to) in &self.edges {
            require(from)?;
            require_target(to)?;
            if outgoing.insert(from, Outgoing::Edge(to)).is_some() {
                return Err(CompilationError::EdgeAndConditional(from));
            }
        }
        for (from, branches) in &self.conditionals {
            require(*from)?;
            let slot = outgoing
                .entry(*from)
                .or_insert_with(|| Outgoing::Branches(HashMap::new()));
            let Outgoing::Branches(map) = slot else {
                return Err(CompilationError::EdgeAndConditional(*from));
            };
            for &(on, to) in branches {
                require_target(to)?;
                if map.insert(on, to).is_some() {
                    return Err(CompilationError::DuplicateBranch {
                        step: *from,
                        next_action: on,
                    });
                }
            }
        }

        let halts = outgoing.values().any(|o| match o {
            Outgoing::Edge(t) => *t == Target::Halt,
            Outgoing::Branches(m) => m.values().any(|t| *t == Target::Halt),
        });
        if !halts {
            return Err(CompilationError::NoHalt);
        }

        Ok(CompiledTransitions { entry, outgoing })
    }
}

/// Frozen table. `resolve` is a pure lookup.
#[derive(Debug, Clone)]
pub struct CompiledTransitions {
    entry: HashMap<NextAction, StepName>,
    outgoing: HashMap<StepName, Outgoing>,
}

impl CompiledTransitions {
    pub fn resolve(
        &self,
        last_completed: Option<StepName>,
        next_action: NextAction,
    ) -> Result<Target, RoutingError> {
        let err = || RoutingError {
            step: last_completed,
            next_action,
        };
        match last_completed {
            None => self
                .entry
                .get(&next_action)
                .map(|s| Target::Step(*s))
                .ok_or_else(err),
            Some(step) => match self.outgoing.get(&step) {
                Some(Outgoing::Edge(t)) => Ok(*t),
                Some(Outgoing::Branches(m)) => m.get(&next_action).copied().ok_or_else(err),
                None => Err(err()),
            },
        }
    }
}
