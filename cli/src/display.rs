//! Terminal rendering of session state.

use tutor::state::Role;
use tutor::{NextAction, SessionState};

/// Agent messages appended after the first `seen` messages.
pub fn new_agent_messages(state: &SessionState, seen: usize) -> Vec<&str> {
    state
        .messages
        .iter()
        .skip(seen)
        .filter(|m| m.role == Role::Agent)
        .map(|m| m.content.as_str())
        .collect()
}

/// One-line progress marker, e.g. `[s1 · concept 1/2 · waiting for your answer]`.
pub fn status_line(state: &SessionState) -> String {
    let total = state.ingestion.concepts.len();
    let progress = match &state.assessment {
        Some(a) if state.next_action != NextAction::Done => {
            format!("question {}/{}", (a.current_index + 1).min(a.mcqs.len()), a.mcqs.len())
        }
        Some(_) => "finished".to_string(),
        None => format!(
            "concept {}/{}",
            (state.teaching.current_concept_index + 1).min(total.max(1)),
            total
        ),
    };
    let waiting = match state.next_action {
        NextAction::WaitForResponse => "waiting for your answer",
        NextAction::Done => "done",
        _ => "paused",
    };
    format!("[{} · {progress} · {waiting}]", state.session_id)
}

/// Prints messages the learner has not seen yet, then the status line.
pub fn print_update(state: &SessionState, seen: usize) {
    for message in new_agent_messages(state, seen) {
        println!("{message}\n");
    }
    println!("{}", status_line(state));
}
