//! Interactive loop: read an answer from stdin, resume, print, repeat until done or EOF.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use cli::display::print_update;
use tutor::{NextAction, TutorEngine};

/// Exits on EOF (Ctrl+D), `quit`/`exit`, or when the session is done.
/// A recoverable error is reported and the same answer can be retried with an empty line.
pub async fn run_chat_loop(
    engine: &TutorEngine,
    session_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let state = engine.state(session_id).await?;
        if state.next_action == NextAction::Done {
            break;
        }
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = reader.next_line().await? else {
            break;
        };
        let line = line.trim();
        if matches!(line, "quit" | "exit" | "/quit") {
            break;
        }

        let seen = state.messages.len();
        let input = (!line.is_empty()).then(|| line.to_string());
        match engine.run(session_id, input).await {
            Ok(state) => print_update(&state, seen),
            Err(e) if e.is_recoverable() => {
                eprintln!("error: {e}\n(press Enter to retry)");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
