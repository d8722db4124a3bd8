//! Checkpoint: durable snapshot of session state plus the last completed step.

use serde::{Deserialize, Serialize};

use crate::graph::StepName;

/// Snapshot written after every completed step (never mid-step).
///
/// `version` starts at 1 and grows by exactly one per write; stores use it to reject a
/// writer that did not start from the latest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    pub session_id: String,
    pub state: S,
    /// `None` until the first step completes.
    pub last_completed_step: Option<StepName>,
    pub version: u64,
    /// RFC 3339 write time.
    pub ts: String,
}

impl<S> Checkpoint<S> {
    /// First snapshot of a session, before any step has run.
    pub fn initial(session_id: impl Into<String>, state: S) -> Self {
        Self {
            session_id: session_id.into(),
            state,
            last_completed_step: None,
            version: 1,
            ts: now_rfc3339(),
        }
    }

    /// The snapshot that replaces this one once `last_completed_step` has produced `state`.
    pub fn successor(&self, state: S, last_completed_step: Option<StepName>) -> Self {
        Self {
            session_id: self.session_id.clone(),
            state,
            last_completed_step,
            version: self.version + 1,
            ts: now_rfc3339(),
        }
    }
}

/// One row of `Checkpointer::list_sessions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointListItem {
    pub session_id: String,
    pub version: u64,
    pub last_completed_step: Option<StepName>,
    pub ts: String,
}

impl<S> From<&Checkpoint<S>> for CheckpointListItem {
    fn from(cp: &Checkpoint<S>) -> Self {
        Self {
            session_id: cp.session_id.clone(),
            version: cp.version,
            last_completed_step: cp.last_completed_step,
            ts: cp.ts.clone(),
        }
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_bumps_version_and_keeps_session() {
        let cp = Checkpoint::initial("s1", 0u32);
        assert_eq!(cp.version, 1);
        assert_eq!(cp.last_completed_step, None);
        let next = cp.successor(1, Some(StepName::Ingest));
        assert_eq!(next.session_id, "s1");
        assert_eq!(next.version, 2);
        assert_eq!(next.state, 1);
        assert_eq!(next.last_completed_step, Some(StepName::Ingest));
        assert!(chrono::DateTime::parse_from_rfc3339(&next.ts).is_ok());
    }
}
