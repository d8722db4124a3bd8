//! File-backed checkpoints: round trips across saver instances and engine restarts.

mod common;
mod init_logging;

use std::sync::Arc;

use common::{pendulum, provider, small_config};
use tutor::{
    Checkpoint, Checkpointer, JsonSerializer, NextAction, SessionState, SqliteSaver, StepName,
    TutorEngine,
};

fn saver(path: &std::path::Path) -> SqliteSaver<SessionState> {
    SqliteSaver::new(path, Arc::new(JsonSerializer)).unwrap()
}

/// **Scenario**: a state written by one SqliteSaver is read back equal by a new saver on
/// the same file.
#[tokio::test]
async fn state_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tutor.db");

    let mut state = pendulum("s1", &["Period"]);
    state.say("Hello!");
    state.next_action = NextAction::WaitForResponse;
    let cp = Checkpoint::initial("s1", state);
    saver(&path).put(&cp).await.unwrap();

    let back = saver(&path).get("s1").await.unwrap().unwrap();
    assert_eq!(back, cp);
}

/// **Scenario**: an engine restarted on the same database resumes where the previous one
/// halted.
#[tokio::test]
async fn engine_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tutor.db");

    {
        let engine = TutorEngine::new(
            Arc::new(saver(&path)),
            provider("understood"),
            small_config(),
        )
        .unwrap();
        engine.start("s1", pendulum("s1", &["Period", "Amplitude"])).await.unwrap();
    }

    let engine = TutorEngine::new(Arc::new(saver(&path)), provider("understood"), small_config())
        .unwrap();
    let s = engine
        .resume("s1", "slower because the string is longer")
        .await
        .unwrap();
    assert_eq!(s.teaching.current_concept_index, 1);
    let cp = engine.checkpoint("s1").await.unwrap().unwrap();
    assert_eq!(cp.last_completed_step, Some(StepName::Probe));
    let listed = engine.sessions().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].version, cp.version);
}
