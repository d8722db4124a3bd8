//! Tutor CLI binary: start a tutoring session, answer its questions, inspect stored sessions.
//!
//! Subcommands: `start`, `answer`, `chat`, `show`, `list`, `archive`.

mod logging;
mod repl;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cli::display::print_update;
use cli::{build_engine, parse_calibre, parse_level, parse_param};
use tutor::{
    Calibre, ControlMode, EngineConfig, LearnerProfile, Level, SessionState, Simulation,
    SimulationParameter,
};

#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(about = "Tutor: interactive simulation tutoring sessions from the terminal")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// SQLite checkpoint file (default: TUTOR_CHECKPOINT_DB or ./tutor-sessions.db)
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    /// Use built-in fallback content instead of calling the model
    #[arg(long, global = true)]
    offline: bool,

    /// Verbose: log step execution and checkpoints to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new session and print the first question
    Start(StartArgs),
    /// Answer the pending question of a session
    Answer {
        session_id: String,
        /// The learner's answer
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Start a session and keep answering interactively
    Chat(StartArgs),
    /// Print a session's current state as JSON
    Show {
        session_id: String,
        /// Pretty-print
        #[arg(long)]
        pretty: bool,
    },
    /// List stored sessions
    List,
    /// Remove a finished session, printing its summary
    Archive { session_id: String },
}

#[derive(clap::Args, Debug, Clone)]
struct StartArgs {
    /// Simulation name, e.g. "Simple Pendulum"
    #[arg(long)]
    simulation: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    url: Option<String>,
    #[arg(long, value_parser = parse_level, default_value = "beginner")]
    level: Level,
    #[arg(long, value_parser = parse_calibre, default_value = "medium")]
    calibre: Calibre,
    /// AUTO: the tutor sets parameters itself; MANUAL: the learner is told what to change
    #[arg(long, default_value = "MANUAL")]
    mode: ControlMode,
    /// Simulation control: name, name=default, or name=default:min..max (repeatable)
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<SimulationParameter>,
    /// Session id (default: random)
    #[arg(long)]
    session_id: Option<String>,
}

impl StartArgs {
    fn initial_state(&self) -> (String, SessionState) {
        let id = self
            .session_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let state = SessionState::new(
            id.clone(),
            Simulation {
                name: self.simulation.clone(),
                url: self.url.clone(),
                description: self.description.clone(),
            },
            LearnerProfile {
                level: self.level,
                calibre: self.calibre,
            },
            self.mode,
        )
        .with_parameters(self.params.clone());
        (id, state)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = EngineConfig::from_env()?;
    logging::init(args.verbose)?;
    let engine = build_engine(config, args.db.as_deref(), args.offline)?;

    match args.cmd {
        Command::Start(start) => {
            let (id, initial) = start.initial_state();
            let state = engine.start(&id, initial).await?;
            println!("session: {id}\n");
            print_update(&state, 0);
        }
        Command::Chat(start) => {
            let (id, initial) = start.initial_state();
            let state = engine.start(&id, initial).await?;
            println!("session: {id}\n");
            print_update(&state, 0);
            repl::run_chat_loop(&engine, &id).await?;
        }
        Command::Answer { session_id, text } => {
            let seen = engine.state(&session_id).await?.messages.len();
            let state = engine.resume(&session_id, text.join(" ")).await?;
            print_update(&state, seen);
        }
        Command::Show { session_id, pretty } => {
            let state = engine.state(&session_id).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&state)?
            } else {
                serde_json::to_string(&state)?
            };
            println!("{json}");
        }
        Command::List => {
            for item in engine.sessions().await? {
                println!(
                    "{}\tv{}\t{}\t{}",
                    item.session_id,
                    item.version,
                    tutor::StepName::label(item.last_completed_step),
                    item.ts
                );
            }
        }
        Command::Archive { session_id } => match engine.archive(&session_id).await? {
            Some(state) => {
                if let Some(summary) = state.assessment.and_then(|a| a.summary) {
                    println!("{}", summary.feedback);
                    println!("recommended next level: {}", summary.recommended_next_level);
                }
                println!("archived {session_id}");
            }
            None => {
                eprintln!("session {session_id} is not finished; nothing archived");
                std::process::exit(1);
            }
        },
    }
    Ok(())
}
