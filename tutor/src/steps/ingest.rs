//! ingest and parse: validate the simulation identity and normalize its declared controls.

use async_trait::async_trait;

use crate::graph::{Step, StepError, StepName};
use crate::state::{NextAction, ParameterValues, SessionState, SimulationParameter};

/// Validates the simulation identity and prepares a fresh teaching phase.
pub struct IngestStep;

#[async_trait]
impl Step for IngestStep {
    fn name(&self) -> StepName {
        StepName::Ingest
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let Some(sim) = state.ingestion.simulation.as_mut() else {
            return Err(StepError::InvalidState("simulation is required".into()));
        };
        sim.name = sim.name.trim().to_string();
        if sim.name.is_empty() {
            return Err(StepError::InvalidState("simulation name is required".into()));
        }
        if sim.description.trim().is_empty() {
            sim.description = format!("Interactive simulation for {}", sim.name);
        }
        tracing::debug!(
            session_id = %state.session_id,
            simulation = %sim.name,
            control_mode = ?state.control_mode,
            "ingested simulation"
        );

        // Re-running on a session that already has progress must not wipe it.
        if state.teaching.interactions.is_empty() {
            state.teaching.current_concept_index = 0;
            state.teaching.current_takeaway_index = 0;
            state.teaching.takeaways.clear();
            state.teaching.understanding_status = None;
            state.teaching.re_explain_count = 0;
            state.assessment = None;
        }
        state.next_action = NextAction::Route;
        Ok(state)
    }
}

/// Normalizes the controls supplied by the initializer: trimmed unique names (first wins),
/// defaults clamped into `[min, max]`, and defaults copied into `active_parameters`.
pub struct ParseStep;

fn clamp_default(p: &mut SimulationParameter) {
    let (Some(lo), Some(hi)) = (p.min, p.max) else {
        return;
    };
    if let Some(v) = p.default.as_ref().and_then(|d| d.as_f64()) {
        let clamped = v.clamp(lo.min(hi), hi.max(lo));
        if clamped != v {
            p.default = serde_json::Number::from_f64(clamped).map(serde_json::Value::Number);
        }
    }
}

#[async_trait]
impl Step for ParseStep {
    fn name(&self) -> StepName {
        StepName::Parse
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        let mut seen = std::collections::HashSet::new();
        let mut parameters = Vec::new();
        for mut p in std::mem::take(&mut state.ingestion.parameters) {
            p.name = p.name.trim().to_string();
            if p.name.is_empty() || !seen.insert(p.name.clone()) {
                continue;
            }
            clamp_default(&mut p);
            parameters.push(p);
        }

        let mut active: ParameterValues = state.teaching.active_parameters.clone();
        for p in &parameters {
            if let Some(d) = &p.default {
                active.entry(p.name.clone()).or_insert_with(|| d.clone());
            }
        }
        tracing::debug!(session_id = %state.session_id, count = parameters.len(), "parsed parameters");

        state.ingestion.parameters = parameters;
        state.teaching.active_parameters = active;
        state.next_action = NextAction::Route;
        Ok(state)
    }
}
