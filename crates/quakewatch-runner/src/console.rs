//! Console commands: the user actions of the monitor.
//!
//! ```text
//! lang <code>   switch display language (en, am, or, ti)
//! notify        toggle push notifications
//! sound         enable the alert sound
//! status        print session state
//! quit          stop the monitor
//! ```

use std::io::BufRead;

use quakewatch_types::Language;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the display language.
    Language(Language),
    /// Toggle push notifications.
    ToggleNotifications,
    /// Enable audio. Any command does this; `sound` does nothing else.
    Sound,
    /// Print the session state.
    Status,
    /// Stop the monitor.
    Quit,
}

/// Why a line was not a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Empty line.
    #[error("empty command")]
    Empty,
    /// `lang` with a missing or unsupported code.
    #[error("unsupported language {0:?}, expected one of en, am, or, ti")]
    UnknownLanguage(String),
    /// Anything else.
    #[error("unknown command {0:?}")]
    Unknown(String),
}

/// Parse one console line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(CommandError::Empty);
    };
    match verb.to_ascii_lowercase().as_str() {
        "lang" | "language" => {
            let code = words.next().unwrap_or_default();
            Language::from_code(code)
                .map(Command::Language)
                .ok_or_else(|| CommandError::UnknownLanguage(code.to_owned()))
        }
        "notify" | "notifications" => Ok(Command::ToggleNotifications),
        "sound" => Ok(Command::Sound),
        "status" => Ok(Command::Status),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_owned())),
    }
}

/// Read commands from `input` line by line and forward them to `tx`.
///
/// Blocking: run it on a dedicated thread, never on the runtime. Invalid
/// lines are logged and skipped. Returns when the input closes or the
/// receiver is dropped.
pub fn read_commands<R: BufRead>(input: R, tx: &mpsc::Sender<Command>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to read console input");
                break;
            }
        };
        match parse_command(&line) {
            Ok(command) => {
                if tx.blocking_send(command).is_err() {
                    break;
                }
            }
            Err(CommandError::Empty) => {}
            Err(e) => warn!(error = %e, "ignoring console input"),
        }
    }
    debug!("console input closed");
}
