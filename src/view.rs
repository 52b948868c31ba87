//! Rendering of session state
//!
//! The session controller owns all state and publishes every change through
//! the [`SessionView`] trait. Views only draw; they never feed back into the
//! controller. Two implementations are provided:
//!
//! - [`ConsoleView`] -- colored terminal output for the interactive REPL
//! - [`HeadlessView`] -- records every event, for one-shot commands and tests

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use colored::Colorize;

use crate::api::User;
use crate::session::ChatInput;
use crate::todos::TodoList;
use crate::transcript::{Message, TranscriptChange};

/// Subscriber to session state changes
pub trait SessionView: Send + Sync {
    /// A transcript entry was appended or removed, or the transcript cleared
    fn transcript_changed(&self, change: &TranscriptChange);

    /// Bring the latest transcript entry into view
    ///
    /// Called after every transcript mutation. Best-effort: a view may defer
    /// or coalesce scrolling.
    fn scroll_to_latest(&self) {}

    /// The chat input was enabled, disabled, or its draft changed
    fn chat_input_changed(&self, _input: &ChatInput) {}

    /// The user directory was replaced
    fn directory_changed(&self, _users: &[User]) {}
}

/// Render a message as terminal text
///
/// The sender is printed on the first line; continuation lines of a
/// multi-line message are indented under the content.
pub fn render_message(message: &Message) -> String {
    let sender = if message.is_assistant() {
        message.sender.blue().bold()
    } else {
        message.sender.green().bold()
    };
    let indent = " ".repeat(message.sender.chars().count() + 2);

    let mut out = String::new();
    for (i, line) in message.content.lines().enumerate() {
        if i == 0 {
            out.push_str(&format!("{}: {}", sender, line));
        } else {
            out.push('\n');
            out.push_str(&indent);
            out.push_str(line);
        }
    }
    if out.is_empty() {
        out = format!("{}:", sender);
    }
    out
}

/// Render the user directory as a short listing
pub fn render_directory(users: &[User]) -> String {
    if users.is_empty() {
        return "No users yet. Add one with /add <name>".to_string();
    }
    users
        .iter()
        .map(|u| format!("  [{}] {}", u.id, u.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a to-do list with a one-line summary
pub fn render_todos(list: &TodoList) -> String {
    let mut out = format!(
        "{}'s todos: {} pending, {} done ({} total)",
        list.user.name, list.stats.pending, list.stats.completed, list.stats.total
    );
    for todo in &list.items {
        let mark = if todo.completed { "x" } else { " " };
        out.push_str(&format!("\n  [{}] {} (#{})", mark, todo.task, todo.id));
    }
    out
}

/// Colored terminal view used by the interactive chat command
///
/// The placeholder is drawn without a trailing newline so that removing it
/// only has to clear the current line. Nothing else may write to the
/// terminal while it is shown; the backend keeps its failure logs at
/// `debug` for that reason.
pub struct ConsoleView {
    out: Mutex<Box<dyn Write + Send>>,
    placeholder_shown: Mutex<bool>,
}

impl fmt::Debug for ConsoleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleView")
            .field("placeholder_shown", &self.placeholder_shown)
            .finish()
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleView {
    /// View drawing to stdout
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// View drawing to an arbitrary writer
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            placeholder_shown: Mutex::new(false),
        }
    }

    fn write(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(text.as_bytes());
        }
    }

    fn set_placeholder_shown(&self, shown: bool) -> bool {
        self.placeholder_shown
            .lock()
            .map(|mut current| std::mem::replace(&mut *current, shown))
            .unwrap_or(false)
    }

    fn erase_placeholder(&self) {
        if self.set_placeholder_shown(false) {
            self.write("\r\x1b[2K");
        }
    }
}

impl SessionView for ConsoleView {
    fn transcript_changed(&self, change: &TranscriptChange) {
        match change {
            TranscriptChange::Appended(message) => {
                self.erase_placeholder();
                self.write(&format!("{}\n", render_message(message)));
            }
            TranscriptChange::Cleared => {
                self.erase_placeholder();
                self.write(&format!(
                    "{}\n",
                    "────────────────────────────────────────".dimmed()
                ));
            }
            TranscriptChange::PlaceholderInserted(placeholder) => {
                self.erase_placeholder();
                self.write(&format!(
                    "{}: {}",
                    placeholder.sender.blue().bold(),
                    "Thinking...".dimmed()
                ));
                self.set_placeholder_shown(true);
            }
            TranscriptChange::PlaceholderRemoved(_) => self.erase_placeholder(),
        }
    }

    fn scroll_to_latest(&self) {
        // The terminal follows output; flushing is all it takes.
        if let Ok(mut out) = self.out.lock() {
            let _ = out.flush();
        }
    }

    fn chat_input_changed(&self, input: &ChatInput) {
        if !input.enabled {
            self.write(&format!(
                "{}\n",
                "Select a user to start chatting (/users, /select <id>)".dimmed()
            ));
        }
    }

    fn directory_changed(&self, users: &[User]) {
        self.write(&format!("{}\n{}\n", "Users:".bold(), render_directory(users)));
    }
}

/// Event captured by [`HeadlessView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Transcript(TranscriptChange),
    Scrolled,
    Input(ChatInput),
    Directory(Vec<User>),
}

/// View that draws nothing and records every event
#[derive(Debug, Default)]
pub struct HeadlessView {
    events: Mutex<Vec<ViewEvent>>,
}

impl HeadlessView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event received so far, oldest first
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Only the transcript changes, oldest first
    pub fn transcript_changes(&self) -> Vec<TranscriptChange> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Transcript(change) => Some(change),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    fn record(&self, event: ViewEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl SessionView for HeadlessView {
    fn transcript_changed(&self, change: &TranscriptChange) {
        self.record(ViewEvent::Transcript(change.clone()));
    }

    fn scroll_to_latest(&self) {
        self.record(ViewEvent::Scrolled);
    }

    fn chat_input_changed(&self, input: &ChatInput) {
        self.record(ViewEvent::Input(input.clone()));
    }

    fn directory_changed(&self, users: &[User]) {
        self.record(ViewEvent::Directory(users.to_vec()));
    }
}
