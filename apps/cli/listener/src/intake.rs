//! Line-oriented command intake from stdin.
//!
//! ```text
//! :restart              restart with a fresh retry budget
//! :reload               re-read config and reconnect
//! :quit                 shut down
//! subscribe <name>      subscribe to a feed
//! unsubscribe <name>    unsubscribe from a feed
//! {"type": ...}         send a raw JSON command
//! ```

use crate::error::ListenerError;

use common::ErrorLocation;
use listener_client::protocol::Command;

use std::panic::Location;

#[derive(Debug, PartialEq)]
pub enum IntakeCommand {
    Restart,
    Reload,
    Quit,
    Send(Command),
}

/// Parse one line of input. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`ListenerError::App`] for unknown directives, a missing feed name,
/// or JSON that is not a valid command object.
pub fn parse_line(line: &str) -> Result<Option<IntakeCommand>, ListenerError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if line.starts_with('{') {
        return parse_raw(line).map(|command| Some(IntakeCommand::Send(command)));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word, rest) {
        (":restart", "") => IntakeCommand::Restart,
        (":reload", "") => IntakeCommand::Reload,
        (":quit", "") => IntakeCommand::Quit,
        ("subscribe", name) if !name.is_empty() => IntakeCommand::Send(Command::subscribe(name)),
        ("unsubscribe", name) if !name.is_empty() => {
            IntakeCommand::Send(Command::unsubscribe(name))
        }
        ("subscribe" | "unsubscribe", _) => {
            return Err(ListenerError::App {
                message: format!("'{word}' needs a feed name"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        _ => {
            return Err(ListenerError::App {
                message: format!("Unrecognized input: {line}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    Ok(Some(command))
}

fn parse_raw(line: &str) -> Result<Command, ListenerError> {
    let value = serde_json::from_str(line).map_err(|e| ListenerError::App {
        message: format!("Invalid JSON: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Command::passthrough(value).map_err(|e| ListenerError::App {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}
