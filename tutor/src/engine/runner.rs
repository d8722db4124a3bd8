use std::sync::Arc;

use crate::content::ContentProvider;
use crate::error::EngineError;
use crate::graph::logging::{
    log_run_error, log_run_halt, log_run_start, log_step_complete, log_step_start,
};
use crate::graph::{
    CompilationError, CompiledTransitions, StepError, StepRegistry, Target, TransitionTable,
};
use crate::memory::{Checkpoint, CheckpointError, CheckpointListItem, Checkpointer};
use crate::resume::ResumeAdapter;
use crate::state::{NextAction, SessionState};

use super::{EngineConfig, SessionLocks};

/// Runs tutoring sessions: resolve, execute, checkpoint, repeat until a halt.
///
/// Every operation on a session holds that session's lock for its whole duration, so
/// runs on one session are strictly serial while different sessions proceed in parallel.
///
/// **Interaction**: Owns the `Checkpointer`, the `StepRegistry` and the compiled
/// `TransitionTable`. Callers only see `start`, `resume`/`run` and read-only inspection.
pub struct TutorEngine {
    checkpointer: Arc<dyn Checkpointer<SessionState>>,
    registry: StepRegistry,
    transitions: CompiledTransitions,
    config: EngineConfig,
    locks: SessionLocks,
}

impl TutorEngine {
    /// Engine with the standard steps backed by `provider`.
    pub fn new(
        checkpointer: Arc<dyn Checkpointer<SessionState>>,
        provider: Arc<dyn ContentProvider>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let registry = StepRegistry::standard(provider, &config);
        Self::with_registry(checkpointer, registry, &TransitionTable::tutoring(), config)
    }

    /// Engine over a custom registry and table; the table is compiled against the registry.
    pub fn with_registry(
        checkpointer: Arc<dyn Checkpointer<SessionState>>,
        registry: StepRegistry,
        table: &TransitionTable,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let transitions = table.compile(&registry)?;
        Ok(Self {
            checkpointer,
            registry,
            transitions,
            config,
            locks: SessionLocks::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Persists `initial_state` as version 1 and runs until the first halt.
    pub async fn start(
        &self,
        session_id: &str,
        initial_state: SessionState,
    ) -> Result<SessionState, EngineError> {
        if session_id.is_empty() {
            return Err(EngineError::InvalidInitialState("session id is empty".into()));
        }
        if initial_state.session_id != session_id {
            return Err(EngineError::InvalidInitialState(format!(
                "state carries session id {:?}, expected {session_id:?}",
                initial_state.session_id
            )));
        }
        let guard = self.locks.acquire(session_id).await;
        let result = self.start_locked(session_id, initial_state).await;
        drop(guard);
        self.locks.release(session_id);
        self.report(session_id, result)
    }

    async fn start_locked(
        &self,
        session_id: &str,
        initial_state: SessionState,
    ) -> Result<SessionState, EngineError> {
        if self.checkpointer.get(session_id).await?.is_some() {
            return Err(EngineError::SessionExists(session_id.to_string()));
        }
        let checkpoint = Checkpoint::initial(session_id, initial_state);
        match self.checkpointer.put(&checkpoint).await {
            Ok(_) => {}
            // another process created it between our get and put
            Err(CheckpointError::Conflict { .. }) => {
                return Err(EngineError::SessionExists(session_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        }
        self.drive(checkpoint).await
    }

    /// Records the learner's answer at the current halt and runs to the next one.
    pub async fn resume(
        &self,
        session_id: &str,
        learner_answer: impl Into<String>,
    ) -> Result<SessionState, EngineError> {
        self.run(session_id, Some(learner_answer.into())).await
    }

    /// Continues a session from its checkpoint. `None` retries after a recoverable error.
    pub async fn run(
        &self,
        session_id: &str,
        external_input: Option<String>,
    ) -> Result<SessionState, EngineError> {
        let guard = self.locks.acquire(session_id).await;
        let result = self.run_locked(session_id, external_input).await;
        drop(guard);
        self.locks.release(session_id);
        self.report(session_id, result)
    }

    async fn run_locked(
        &self,
        session_id: &str,
        external_input: Option<String>,
    ) -> Result<SessionState, EngineError> {
        let checkpoint = self.load(session_id).await?;
        let checkpoint = match external_input {
            Some(answer) => {
                let resumed = ResumeAdapter::apply(checkpoint, &answer).map_err(|source| {
                    EngineError::Routing {
                        session_id: session_id.to_string(),
                        source,
                    }
                })?;
                if resumed.applied {
                    self.checkpointer.put(&resumed.checkpoint).await?;
                } else {
                    tracing::debug!(session_id, "not waiting for input, answer ignored");
                }
                resumed.checkpoint
            }
            None => checkpoint,
        };
        self.drive(checkpoint).await
    }

    /// Current checkpointed state.
    pub async fn state(&self, session_id: &str) -> Result<SessionState, EngineError> {
        Ok(self.load(session_id).await?.state)
    }

    /// Full checkpoint, including version and last completed step.
    pub async fn checkpoint(
        &self,
        session_id: &str,
    ) -> Result<Option<Checkpoint<SessionState>>, EngineError> {
        Ok(self.checkpointer.get(session_id).await?)
    }

    pub async fn sessions(&self) -> Result<Vec<CheckpointListItem>, EngineError> {
        Ok(self.checkpointer.list_sessions().await?)
    }

    /// Removes a finished session and returns its final state. Unfinished sessions are
    /// left in place and yield `Ok(None)`.
    pub async fn archive(&self, session_id: &str) -> Result<Option<SessionState>, EngineError> {
        let guard = self.locks.acquire(session_id).await;
        let result = self.archive_locked(session_id).await;
        drop(guard);
        self.locks.release(session_id);
        result
    }

    async fn archive_locked(&self, session_id: &str) -> Result<Option<SessionState>, EngineError> {
        let checkpoint = self.load(session_id).await?;
        if checkpoint.state.next_action != NextAction::Done {
            return Ok(None);
        }
        self.checkpointer.delete(session_id).await?;
        tracing::info!(session_id, "archived session");
        Ok(Some(checkpoint.state))
    }

    async fn load(&self, session_id: &str) -> Result<Checkpoint<SessionState>, EngineError> {
        self.checkpointer
            .get(session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))
    }

    fn report(
        &self,
        session_id: &str,
        result: Result<SessionState, EngineError>,
    ) -> Result<SessionState, EngineError> {
        if let Err(e) = &result {
            log_run_error(session_id, e);
        }
        result
    }

    /// The run loop. Routing is resolved before the step budget is checked, so a halt
    /// reached exactly at `max_steps` is still a success.
    async fn drive(
        &self,
        mut checkpoint: Checkpoint<SessionState>,
    ) -> Result<SessionState, EngineError> {
        let session_id = checkpoint.session_id.clone();
        log_run_start(
            &session_id,
            checkpoint.last_completed_step,
            checkpoint.state.next_action,
        );
        let mut steps_taken = 0usize;
        loop {
            let target = self
                .transitions
                .resolve(checkpoint.last_completed_step, checkpoint.state.next_action)
                .map_err(|source| EngineError::Routing {
                    session_id: session_id.clone(),
                    source,
                })?;
            let step_name = match target {
                Target::Halt => {
                    log_run_halt(
                        &session_id,
                        checkpoint.last_completed_step,
                        checkpoint.state.next_action,
                        steps_taken,
                    );
                    return Ok(checkpoint.state);
                }
                Target::Step(name) => name,
            };
            if steps_taken >= self.config.max_steps {
                return Err(EngineError::RunawayExecution {
                    session_id,
                    max_steps: self.config.max_steps,
                    last_step: checkpoint.last_completed_step,
                });
            }
            let step = self
                .registry
                .get(step_name)
                .ok_or(EngineError::Compilation(CompilationError::StepNotRegistered(step_name)))?;

            log_step_start(&session_id, step_name);
            let next_state = step
                .run(checkpoint.state.clone())
                .await
                .map_err(|source| EngineError::StepExecution {
                    session_id: session_id.clone(),
                    step: step_name,
                    source,
                })?;
            if next_state.session_id != session_id {
                return Err(EngineError::StepExecution {
                    session_id,
                    step: step_name,
                    source: StepError::InvalidState("step changed the session id".into()),
                });
            }

            let next = checkpoint.successor(next_state, Some(step_name));
            self.checkpointer.put(&next).await?;
            log_step_complete(&session_id, step_name, next.state.next_action, next.version);
            checkpoint = next;
            steps_taken += 1;
        }
    }
}
