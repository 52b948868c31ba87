//! Special commands parser for interactive chat mode
//!
//! This module parses the slash commands that can be entered during an
//! interactive chat session. Special commands allow users to:
//! - List, select, deselect, and add users
//! - Reload the directory or the current conversation
//! - Show the selected user's to-do list
//! - View session status
//! - Display help information
//! - Exit the session
//!
//! Command words are case-insensitive; arguments keep their case.

use crate::api::UserId;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session rather than being sent to the
/// assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Reload and print the user directory
    ListUsers,

    /// Select the user with this id
    Select(UserId),

    /// Clear the selection and show the welcome message
    Deselect,

    /// Create a user with this name
    ///
    /// The name may be empty; the directory rejects it with a warning.
    AddUser(String),

    /// Reload the conversation of the selected user
    History,

    /// Show the to-do list of the selected user
    Todos,

    /// Display session status
    Status,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a chat message.
    None,
}

fn no_argument(command: &str, arg: &str, cmd: SpecialCommand) -> Result<SpecialCommand, CommandError> {
    if arg.is_empty() {
        Ok(cmd)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        })
    }
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a valid command, `MissingArgument` when `/select` has no id, and
/// `UnsupportedArgument` when an argument-less command receives one.
///
/// # Examples
///
/// ```
/// use todobot::api::UserId;
/// use todobot::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/select 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::Select(UserId::Int(2)));
///
/// let cmd = parse_special_command("/add Mary Jane").unwrap();
/// assert_eq!(cmd, SpecialCommand::AddUser("Mary Jane".to_string()));
///
/// let cmd = parse_special_command("buy milk").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/users" | "/refresh" => no_argument(&word, arg, SpecialCommand::ListUsers),
        "/select" | "/user" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: word.clone(),
                    usage: "/select <user id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Select(UserId::parse(arg)))
            }
        }
        "/deselect" => no_argument("/deselect", arg, SpecialCommand::Deselect),
        "/add" => Ok(SpecialCommand::AddUser(arg.to_string())),
        "/history" => no_argument("/history", arg, SpecialCommand::History),
        "/todos" => no_argument("/todos", arg, SpecialCommand::Todos),
        "/status" => no_argument("/status", arg, SpecialCommand::Status),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(word)),
    }
}

/// Print help for the interactive session
pub fn print_help() {
    println!(
        r#"
Commands:
  /users, /refresh  Reload and list users
  /select <id>      Chat as the user with this id
  /deselect         Clear the selection
  /add <name>       Create a new user
  /history          Reload the selected user's conversation
  /todos            Show the selected user's to-do list
  /status           Show session status
  /help             Show this help
  exit | quit       Leave the session

Anything else is sent to the assistant as a message.
"#
    );
}
