use async_trait::async_trait;

use crate::graph::{Step, StepError, StepName};
use crate::state::{NextAction, SessionState};

/// Top-level router. No external calls.
///
/// * all concepts taught → `assess`
/// * last classification was `confused` → `re_explain`
/// * otherwise → `plan`
pub fn decide(state: &SessionState) -> NextAction {
    if state.all_concepts_taught() {
        NextAction::Assess
    } else if state
        .teaching
        .understanding_status
        .as_ref()
        .is_some_and(|s| s.is_confused())
    {
        NextAction::ReExplain
    } else {
        NextAction::Plan
    }
}

pub struct RouteStep;

#[async_trait]
impl Step for RouteStep {
    fn name(&self) -> StepName {
        StepName::Route
    }

    async fn run(&self, mut state: SessionState) -> Result<SessionState, StepError> {
        state.next_action = decide(&state);
        tracing::debug!(
            session_id = %state.session_id,
            concept = state.teaching.current_concept_index,
            of = state.ingestion.concepts.len(),
            next_action = %state.next_action,
            "routed"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Concept, Understanding, UnderstandingStatus};
    use crate::steps::test_support::fresh_state;

    fn with(concepts: usize, index: usize, status: Option<Understanding>) -> SessionState {
        let mut s = fresh_state().with_concepts(
            (0..concepts)
                .map(|i| Concept {
                    name: format!("c{i}"),
                    description: String::new(),
                    importance: "high".into(),
                })
                .collect(),
        );
        s.teaching.current_concept_index = index;
        s.teaching.understanding_status = status.map(|l| UnderstandingStatus::new(l, 0.8, ""));
        s
    }

    /// **Scenario**: plan iff index < len and not confused; assess iff index >= len; the two
    /// never overlap for any combination.
    #[test]
    fn plan_and_assess_are_exclusive_and_exhaustive() {
        let statuses = [
            None,
            Some(Understanding::Understood),
            Some(Understanding::Partial),
            Some(Understanding::Confused),
        ];
        for len in 0..4 {
            for index in 0..=len {
                for status in statuses {
                    let s = with(len, index, status);
                    let d = decide(&s);
                    let expect_plan = index < len && status != Some(Understanding::Confused);
                    let expect_assess = index >= len;
                    assert_eq!(d == NextAction::Plan, expect_plan, "len={len} index={index} {status:?}");
                    assert_eq!(d == NextAction::Assess, expect_assess, "len={len} index={index} {status:?}");
                    if !expect_plan && !expect_assess {
                        assert_eq!(d, NextAction::ReExplain);
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn route_step_writes_next_action_only() {
        let s = with(2, 1, None);
        let out = RouteStep.run(s.clone()).await.unwrap();
        assert_eq!(out.next_action, NextAction::Plan);
        assert_eq!(out.teaching, s.teaching);
    }
}
