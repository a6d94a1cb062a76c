//! Terminal front end helpers for the `orion` binary

use std::io::Write;

use colored::Colorize;
use llm::HistoryTurn;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use uuid::Uuid;

use crate::dispatch::{DispatchEngine, DispatchRequest, ResponseEnvelope};
use crate::error::Result;

/// Turns kept for the model in an interactive session
const MAX_HISTORY_TURNS: usize = 20;

/// Print one envelope, as JSON or as colored text
pub fn print_envelope(envelope: &ResponseEnvelope, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(envelope)?);
        return Ok(());
    }

    if envelope.is_failure() {
        println!("{}", envelope.text.yellow());
    } else {
        println!("{}", envelope.text);
    }
    if let Some(path) = &envelope.artifact {
        println!("  {} {}", "📎".cyan(), path.display().to_string().cyan());
    }
    Ok(())
}

/// Interactive loop over stdin until EOF or an exit word
///
/// The session gets its own id, so its charts are isolated from other
/// sessions, and the conversation so far is passed to the model as history.
pub async fn run_repl(engine: &DispatchEngine) -> Result<()> {
    let session = Uuid::new_v4();
    let pack = engine.pack();
    let mut history: Vec<HistoryTurn> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    debug!(session = %session, "Interactive session started");
    println!("{}", pack.replies.greeting.green().bold());

    loop {
        print!("{} ", ">".bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if pack.is_exit_word(message) {
            println!("{}", pack.replies.goodbye);
            break;
        }

        let request = DispatchRequest::new(message)
            .with_session(session)
            .with_history(history.clone());
        let envelope = engine.handle_request(request).await;
        print_envelope(&envelope, false)?;

        if !envelope.is_failure() {
            history.push(HistoryTurn::user(message));
            history.push(HistoryTurn::model(envelope.text.clone()));
            let excess = history.len().saturating_sub(MAX_HISTORY_TURNS);
            history.drain(..excess);
        }
    }

    engine.artifacts().forget(session);
    debug!(session = %session, "Interactive session ended");
    Ok(())
}
