/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`    Interactive chat session
- `users`   List or create users
- `history` Print a user's stored conversation
- `todos`   Print a user's to-do list

Every handler drives a [`SessionController`]; the interactive one draws
through the console, the one-shot ones run it headless and print the
result.
*/

use std::sync::Arc;

use crate::api::{HttpBackend, UserId};
use crate::config::Config;
use crate::error::{Result, TodobotError};
use crate::notify::{NotificationLevel, NotificationLog, Notifier};
use crate::session::SessionController;
use crate::view::{HeadlessView, SessionView};

// Special commands parser for the interactive session
pub mod special_commands;

/// Build a controller that draws nothing and records notifications
fn headless_controller(config: &Config) -> Result<(SessionController, Arc<NotificationLog>)> {
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let log = Arc::new(NotificationLog::new());
    let view: Arc<dyn SessionView> = Arc::new(HeadlessView::new());
    let notifier: Arc<dyn Notifier> = log.clone();
    let controller = SessionController::new(backend, notifier, view, &config.ui);
    Ok((controller, log))
}

/// Turn the last error notification into a command failure
fn failure(log: &NotificationLog, fallback: &str) -> anyhow::Error {
    let text = log
        .entries()
        .into_iter()
        .rev()
        .find(|n| n.level == NotificationLevel::Error || n.level == NotificationLevel::Warning)
        .map(|n| n.text)
        .unwrap_or_else(|| fallback.to_string());
    TodobotError::Command(text).into()
}

// Interactive chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Wires the HTTP backend, console notifier, and console view into a
    //! controller and runs a readline loop over it.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::notify::ConsoleNotifier;
    use crate::session::SelectOutcome;
    use crate::view::{render_directory, render_todos, ConsoleView};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `user` - Optional user id to select once the directory is loaded
    pub async fn run_chat(config: Config, user: Option<String>) -> Result<()> {
        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        tracing::info!("Using backend at {}", backend.base_url());

        let notifier = Arc::new(ConsoleNotifier::new(config.ui.notification_duration()));
        let view = Arc::new(ConsoleView::new());
        let mut controller =
            SessionController::new(backend, notifier.clone(), view, &config.ui);

        print_welcome_banner(controller.assistant_name());
        controller.start().await;

        if let Some(id) = user {
            select(&mut controller, &UserId::parse(&id)).await;
        }

        let mut rl = DefaultEditor::new()?;

        loop {
            let prompt = prompt_for(&controller);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::ListUsers => {
                            // A failed refresh still shows the last snapshot.
                            if !controller.refresh_users().await {
                                println!("{}", render_directory(controller.directory().users()));
                            }
                        }
                        SpecialCommand::Select(id) => select(&mut controller, &id).await,
                        SpecialCommand::Deselect => {
                            controller.select_user(None).await;
                        }
                        SpecialCommand::AddUser(name) => {
                            controller.create_user(&name).await;
                        }
                        SpecialCommand::History => {
                            if controller.session().selected_user().is_none() {
                                eprintln!("{}", "No user selected".yellow());
                            } else {
                                controller.load_history().await;
                            }
                        }
                        SpecialCommand::Todos => {
                            if let Some(list) = controller.todos().await {
                                println!("{}", render_todos(&list));
                            }
                        }
                        SpecialCommand::Status => print_status(&controller, &notifier),
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            controller.set_draft(trimmed);
                            let outcome = controller.send_draft().await;
                            tracing::debug!("Send finished: {:?}", outcome);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn select(controller: &mut SessionController, id: &UserId) {
        if controller.select_user(Some(id)).await == SelectOutcome::UnknownUser {
            eprintln!(
                "{}",
                format!("No user with id {}. Type /users to list them.", id).yellow()
            );
        }
    }

    fn prompt_for(controller: &SessionController) -> String {
        match controller.session().selected_user() {
            Some(user) => format!("{} > ", user.name),
            None => "> ".to_string(),
        }
    }

    fn print_welcome_banner(assistant: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!(
            "║ {:<61}║",
            format!("{} Interactive Chat - Welcome!", assistant)
        );
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_status(controller: &SessionController, notifier: &ConsoleNotifier) {
        println!("\n{}", "Session status".bold());
        println!("{}", controller.status());
        if let Some(n) = notifier.visible() {
            println!("Notification:    {}", n.colored_line());
        }
        println!();
    }
}

// User management command handlers
pub mod users {
    //! One-shot user directory commands.

    use super::*;
    use crate::directory::CreateOutcome;
    use crate::view::render_directory;

    /// Print every user known to the backend
    ///
    /// With `json` the list is printed as a JSON array of `{id, name}`.
    pub async fn list_users(config: Config, json: bool) -> Result<()> {
        let (mut controller, log) = headless_controller(&config)?;
        if !controller.refresh_users().await {
            return Err(failure(&log, "Error loading users"));
        }

        let users = controller.directory().users();
        if json {
            let json = serde_json::to_string_pretty(users).map_err(TodobotError::Serialization)?;
            println!("{}", json);
        } else {
            println!("{}", render_directory(users));
        }
        Ok(())
    }

    /// Create a user and print the new id
    pub async fn add_user(config: Config, name: String) -> Result<()> {
        let (mut controller, log) = headless_controller(&config)?;
        match controller.create_user(&name).await {
            CreateOutcome::Created(user) => {
                println!("User '{}' added successfully (id {})", user.name, user.id);
                Ok(())
            }
            CreateOutcome::InvalidName | CreateOutcome::Failed => {
                Err(failure(&log, "Error creating user"))
            }
        }
    }
}

// Conversation history command handler
pub mod history {
    //! Print a stored conversation without starting a session.

    use super::*;
    use crate::session::SelectOutcome;
    use crate::view::render_message;

    /// Print the stored conversation of the given user
    pub async fn show_history(config: Config, user: String) -> Result<()> {
        let (mut controller, log) = headless_controller(&config)?;
        if !controller.refresh_users().await {
            return Err(failure(&log, "Error loading users"));
        }

        let id = UserId::parse(&user);
        if controller.select_user(Some(&id)).await == SelectOutcome::UnknownUser {
            return Err(TodobotError::Command(format!("No user with id {}", id)).into());
        }
        if log.count(NotificationLevel::Error) > 0 {
            return Err(failure(&log, "Error loading conversation history"));
        }

        let transcript = controller.session().transcript();
        if transcript.is_empty() {
            println!("No messages yet.");
        }
        for message in transcript.messages() {
            println!("{}", render_message(message));
        }
        Ok(())
    }
}

// To-do list command handler
pub mod todos {
    //! Print a user's to-do list without starting a session.

    use super::*;
    use crate::session::SelectOutcome;
    use crate::view::render_todos;

    /// Print the to-do items and counts of the given user
    ///
    /// With `json` the list is printed as `{user, items, stats}`.
    pub async fn show_todos(config: Config, user: String, json: bool) -> Result<()> {
        let (mut controller, log) = headless_controller(&config)?;
        if !controller.refresh_users().await {
            return Err(failure(&log, "Error loading users"));
        }

        let id = UserId::parse(&user);
        if controller.select_user(Some(&id)).await == SelectOutcome::UnknownUser {
            return Err(TodobotError::Command(format!("No user with id {}", id)).into());
        }

        let Some(list) = controller.todos().await else {
            return Err(failure(&log, "Error loading todos"));
        };
        if json {
            let json = serde_json::to_string_pretty(&list).map_err(TodobotError::Serialization)?;
            println!("{}", json);
        } else {
            println!("{}", render_todos(&list));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notification;

    #[test]
    fn test_failure_uses_latest_problem_notification() {
        let log = NotificationLog::new();
        log.notify(Notification::warning("Please enter a user name"));
        log.notify(Notification::info("Selected user: Alice"));

        let err = failure(&log, "fallback");
        assert_eq!(err.to_string(), "Command failed: Please enter a user name");
    }

    #[test]
    fn test_failure_falls_back_when_nothing_went_wrong() {
        let log = NotificationLog::new();
        let err = failure(&log, "Error loading users");
        assert!(err.to_string().contains("Error loading users"));
    }
}
