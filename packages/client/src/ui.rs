//! UI utilities for the client.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::domain::normalize_input;

/// Prompt shown while waiting for input
pub fn prompt(username: &str) -> String {
    format!("{}> ", username)
}

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(username: &str) {
    print!("{}", prompt(username));
    std::io::stdout().flush().ok();
}

/// Ask for a username until a non-blank one is entered.
///
/// Returns `None` when the user exits with Ctrl+C / Ctrl+D.
pub fn prompt_username() -> Option<String> {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            tracing::error!("Failed to initialize readline: {}", e);
            return None;
        }
    };

    loop {
        match rl.readline("Username: ") {
            Ok(line) => {
                if let Some(username) = normalize_input(&line) {
                    return Some(username);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return None,
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                return None;
            }
        }
    }
}

/// Read lines on a dedicated thread and forward non-blank ones.
///
/// The reader outlives reconnects. The returned channel closes when the user
/// presses Ctrl+C or Ctrl+D.
pub fn spawn_input_reader(username: &str) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = prompt(username);

    // rustyline is synchronous, so it runs on a plain thread
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let Some(content) = normalize_input(&line) else {
                        continue;
                    };
                    rl.add_history_entry(content.as_str()).ok();
                    if input_tx.send(content).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
