//! Failure and retry behavior: provider outages, replayed resumes, version conflicts.

mod common;
mod init_logging;

use common::{assert_halted, harness, pendulum, provider, small_config};
use tutor::content::ContentKind;
use tutor::{
    Checkpoint, CheckpointError, Checkpointer, EngineError, NextAction, ProviderError,
    SessionState, StepError, StepName,
};

/// **Scenario**: the classifier is unavailable once. The resume fails with a recoverable
/// StepExecution error, the checkpoint still has check_understanding pending, and a plain
/// `run(id, None)` completes the cycle without appending a second interaction.
#[tokio::test]
async fn unavailable_provider_then_retry() {
    let h = harness(provider("understood"), small_config());
    let e = &h.engine;
    e.start("s1", pendulum("s1", &["Period", "Amplitude"])).await.unwrap();
    h.provider
        .push_failure(ContentKind::Classification, ProviderError::Unavailable("503".into()));

    let err = e.resume("s1", "slower because it is longer").await.unwrap_err();
    assert!(err.is_recoverable());
    match &err {
        EngineError::StepExecution { step, source, .. } => {
            assert_eq!(*step, StepName::CheckUnderstanding);
            assert!(matches!(source, StepError::Provider(ProviderError::Unavailable(_))));
        }
        other => panic!("unexpected {other:?}"),
    }
    let cp = e.checkpoint("s1").await.unwrap().unwrap();
    assert_eq!(cp.last_completed_step, Some(StepName::Probe));
    assert_eq!(cp.state.next_action, NextAction::CheckUnderstanding);
    assert_eq!(cp.state.teaching.interactions.len(), 1);

    let s = e.run("s1", None).await.unwrap();
    assert_eq!(s.teaching.interactions.len(), 1);
    assert!(s.teaching.interactions[0].understanding_status.is_some());
    assert_eq!(s.teaching.current_concept_index, 1);
    assert_halted(&h.store, "s1").await;
}

/// **Scenario**: replaying the same resume after a failure does not record the answer twice;
/// the answer is ignored because the session is no longer waiting.
#[tokio::test]
async fn replayed_resume_is_idempotent() {
    let h = harness(provider("understood"), small_config());
    let e = &h.engine;
    e.start("s1", pendulum("s1", &["Period"])).await.unwrap();
    h.provider
        .push_failure(ContentKind::Classification, ProviderError::Unavailable("timeout".into()));

    assert!(e.resume("s1", "because longer, slower").await.is_err());
    let s = e.resume("s1", "because longer, slower").await.unwrap();
    assert_eq!(s.teaching.interactions.len(), 1);
    assert_eq!(h.provider.calls(ContentKind::Classification), 2);
}

/// **Scenario**: checkpoint versions grow by exactly one per step, and a writer that starts
/// from a stale snapshot is rejected.
#[tokio::test]
async fn versions_are_sequential_and_stale_writes_conflict() {
    let h = harness(provider("understood"), small_config());
    h.engine.start("s1", pendulum("s1", &["Period"])).await.unwrap();
    let cp = h.store.get("s1").await.unwrap().unwrap();
    // ingest, parse, extract_concepts, route, plan, teach, probe
    assert_eq!(cp.version, 8);

    let stale: Checkpoint<SessionState> = Checkpoint {
        version: cp.version,
        ..cp.clone()
    };
    let err = h.store.put(&stale).await.unwrap_err();
    assert!(matches!(
        err,
        CheckpointError::Conflict { expected: 7, found: 8, .. }
    ));
    assert_eq!(h.store.put(&cp.successor(cp.state.clone(), cp.last_completed_step)).await.unwrap(), 9);
}

/// **Scenario**: an unparseable classification is not an error; the keyword classifier
/// takes over.
#[tokio::test]
async fn malformed_classification_falls_back() {
    let h = harness(provider("understood"), small_config());
    let e = &h.engine;
    e.start("s1", pendulum("s1", &["Period"])).await.unwrap();
    h.provider.push(ContentKind::Classification, "");

    let s = e.resume("s1", "I don't know").await.unwrap();
    let status = s.teaching.interactions[0].understanding_status.clone().unwrap();
    assert_eq!(status.label, tutor::Understanding::Confused);
    assert_eq!(status.confidence, 0.6);
    assert_eq!(s.next_action, NextAction::WaitForResponse);
}
