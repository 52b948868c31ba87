//! Conversation session controller
//!
//! The [`SessionController`] owns the single [`Session`] of a chat client:
//! which user is selected, the transcript shown for them, the chat input
//! state, and the lifecycle of the one chat request that may be in flight.
//!
//! # Send protocol
//!
//! ```text
//! Idle --begin_send--> Sending --complete_send--> Idle
//!                         |
//!                         +-- reply      -> assistant message with the reply
//!                         +-- non-2xx    -> fixed "server error" message
//!                         +-- transport  -> fixed "connection error" message
//!                                           + error notification
//! ```
//!
//! `begin_send` echoes the operator's message into the transcript before
//! any network I/O and shows the pending placeholder. `complete_send`
//! removes that placeholder (by identity) and appends exactly one terminal
//! message. A second `begin_send` while `Sending` is rejected.
//!
//! Changing the selected user abandons an in-flight exchange: its
//! placeholder goes away with the transcript and its eventual completion is
//! discarded. The server still stores the exchange, so it shows up the next
//! time that user's history is loaded.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::api::{Backend, User, UserId};
use crate::config::UiConfig;
use crate::directory::{CreateOutcome, UserDirectory};
use crate::error::ApiError;
use crate::notify::{Notification, Notifier};
use crate::todos::{self, TodoList};
use crate::transcript::{Message, PlaceholderId, Transcript, TranscriptChange};
use crate::view::SessionView;

/// Assistant message shown when no user is selected
pub const WELCOME_MESSAGE: &str = "Welcome! Please select a user to start chatting.";

/// Assistant message shown when the backend rejects a chat request
pub const SERVER_ERROR_REPLY: &str = "Sorry, I encountered an error processing your request.";

/// Assistant message shown when a chat request cannot reach the backend
pub const CONNECTION_ERROR_REPLY: &str = "Connection error. Please try again.";

/// State of the chat input affordance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatInput {
    /// Whether the operator can type and send; true iff a user is selected
    pub enabled: bool,
    /// Text typed but not yet sent
    pub draft: String,
}

/// Where the session is in the send/receive protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Sending { placeholder: PlaceholderId },
}

/// Working state of one chat client
#[derive(Debug, Clone)]
pub struct Session {
    selected_user: Option<User>,
    transcript: Transcript,
    exchange: ExchangeState,
    input: ChatInput,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            selected_user: None,
            transcript: Transcript::new(),
            exchange: ExchangeState::Idle,
            input: ChatInput::default(),
        }
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.selected_user.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True while a chat request is outstanding
    pub fn pending_request(&self) -> bool {
        matches!(self.exchange, ExchangeState::Sending { .. })
    }

    pub fn input(&self) -> &ChatInput {
        &self.input
    }

    pub fn chat_enabled(&self) -> bool {
        self.input.enabled
    }
}

/// Why a send did not start
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    #[error("no user selected")]
    NoUserSelected,
    #[error("message is empty")]
    EmptyMessage,
    #[error("a reply is still pending")]
    AlreadySending,
}

/// A chat request that has been started but not completed
///
/// Returned by [`SessionController::begin_send`] and consumed by
/// [`SessionController::complete_send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub user: User,
    pub message: String,
    pub placeholder: PlaceholderId,
}

/// How a send attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Preconditions failed; nothing was sent
    Skipped(SendRejected),
    /// The assistant replied
    Fulfilled,
    /// The backend answered with a non-success status
    ServerRejected { status: u16 },
    /// The request never produced a usable response
    ConnectionFailed,
    /// The selection changed while the request was in flight
    Abandoned,
}

/// Result of [`SessionController::select_user`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    Deselected,
    Unchanged,
    /// The id is not in the current directory snapshot; ignored
    UnknownUser,
}

/// Point-in-time summary of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub selected_user: Option<User>,
    pub messages: usize,
    pub pending_request: bool,
    pub chat_enabled: bool,
    pub known_users: usize,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selected_user {
            Some(u) => writeln!(f, "Selected user:   {} [{}]", u.name, u.id)?,
            None => writeln!(f, "Selected user:   (none)")?,
        }
        writeln!(f, "Transcript:      {} messages", self.messages)?;
        writeln!(
            f,
            "Reply pending:   {}",
            if self.pending_request { "yes" } else { "no" }
        )?;
        writeln!(
            f,
            "Chat input:      {}",
            if self.chat_enabled { "enabled" } else { "disabled" }
        )?;
        write!(f, "Known users:     {}", self.known_users)
    }
}

/// Owner of the session state and mediator between backend and view
pub struct SessionController {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    view: Arc<dyn SessionView>,
    directory: UserDirectory,
    session: Session,
    assistant_name: String,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("backend", &self.backend)
            .field("session", &self.session)
            .field("assistant_name", &self.assistant_name)
            .finish()
    }
}

impl SessionController {
    /// Create a controller with nothing selected and an empty transcript
    ///
    /// Call [`start`](Self::start) to load the directory and show the
    /// welcome message.
    pub fn new(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        view: Arc<dyn SessionView>,
        ui: &UiConfig,
    ) -> Self {
        Self {
            backend,
            notifier,
            view,
            directory: UserDirectory::new(),
            session: Session::new(),
            assistant_name: ui.assistant_name.clone(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            selected_user: self.session.selected_user.clone(),
            messages: self.session.transcript.len(),
            pending_request: self.session.pending_request(),
            chat_enabled: self.session.chat_enabled(),
            known_users: self.directory.users().len(),
        }
    }

    /// Show the welcome state and load the user directory
    pub async fn start(&mut self) {
        self.show_welcome();
        self.refresh_users().await;
    }

    fn render(&self, change: &TranscriptChange) {
        self.view.transcript_changed(change);
        self.view.scroll_to_latest();
    }

    fn publish_input(&self) {
        self.view.chat_input_changed(&self.session.input);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.session.input.enabled = enabled;
        self.publish_input();
    }

    fn clear_transcript(&mut self) {
        let change = self.session.transcript.clear();
        self.render(&change);
    }

    fn append(&mut self, message: Message) {
        let change = self.session.transcript.append(message);
        self.render(&change);
    }

    fn show_welcome(&mut self) {
        self.session.exchange = ExchangeState::Idle;
        self.set_input_enabled(false);
        self.clear_transcript();
        let welcome = Message::assistant(self.assistant_name.clone(), WELCOME_MESSAGE);
        self.append(welcome);
    }

    /// Reload the user directory from the backend
    pub async fn refresh_users(&mut self) -> bool {
        let refreshed = self
            .directory
            .refresh(self.backend.as_ref(), self.notifier.as_ref())
            .await;
        if refreshed {
            self.view.directory_changed(self.directory.users());
        }
        refreshed
    }

    /// Create a user and reload the directory
    pub async fn create_user(&mut self, name: &str) -> CreateOutcome {
        let outcome = self
            .directory
            .create(name, self.backend.as_ref(), self.notifier.as_ref())
            .await;
        if matches!(outcome, CreateOutcome::Created(_)) {
            self.view.directory_changed(self.directory.users());
        }
        outcome
    }

    /// Change the selected user
    ///
    /// `None` deselects. Ids must come from the current directory snapshot;
    /// anything else is logged and ignored.
    pub async fn select_user(&mut self, id: Option<&UserId>) -> SelectOutcome {
        let Some(id) = id else {
            if self.session.selected_user.is_none() {
                self.publish_input();
                return SelectOutcome::Unchanged;
            }
            tracing::debug!("Deselecting user");
            self.session.selected_user = None;
            self.show_welcome();
            return SelectOutcome::Deselected;
        };

        let Some(user) = self.directory.find(id).cloned() else {
            tracing::warn!("Ignoring selection of unknown user id {}", id);
            return SelectOutcome::UnknownUser;
        };

        if self.session.selected_user.as_ref() == Some(&user) {
            self.publish_input();
            return SelectOutcome::Unchanged;
        }

        if let ExchangeState::Sending { placeholder } = self.session.exchange {
            tracing::debug!("Abandoning in-flight exchange {}", placeholder);
        }

        tracing::info!("Selected user {} ({})", user.name, user.id);
        self.session.exchange = ExchangeState::Idle;
        self.session.selected_user = Some(user.clone());
        self.set_input_enabled(true);
        self.clear_transcript();
        self.load_history().await;
        self.notifier
            .notify(Notification::info(format!("Selected user: {}", user.name)));
        SelectOutcome::Selected
    }

    /// Replace the transcript with the selected user's stored history
    ///
    /// Returns `false` without touching the transcript when nothing is
    /// selected or the fetch fails.
    pub async fn load_history(&mut self) -> bool {
        let Some(user) = self.session.selected_user.clone() else {
            return false;
        };

        match self.backend.conversation_history(&user.id).await {
            Ok(records) => {
                tracing::debug!("Loaded {} history records for {}", records.len(), user.id);
                self.clear_transcript();
                for record in records {
                    let message = if record.is_assistant() {
                        Message::assistant(self.assistant_name.clone(), record.content)
                    } else {
                        Message::user(user.name.clone(), record.content)
                    };
                    self.append(message);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load history for {}: {}", user.id, e);
                self.notifier
                    .notify(Notification::error("Error loading conversation history"));
                false
            }
        }
    }

    /// Fetch the selected user's to-do list
    ///
    /// Leaves the transcript alone; without a selection a warning is shown.
    pub async fn todos(&self) -> Option<TodoList> {
        let Some(user) = self.session.selected_user.as_ref() else {
            self.notifier
                .notify(Notification::warning("Please select a user first"));
            return None;
        };
        todos::fetch(self.backend.as_ref(), self.notifier.as_ref(), user).await
    }

    /// Replace the unsent input text
    ///
    /// Ignored while the input is disabled (no user selected).
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if !self.session.input.enabled {
            return;
        }
        self.session.input.draft = text.into();
        self.publish_input();
    }

    /// Send whatever is in the input draft
    pub async fn send_draft(&mut self) -> SendOutcome {
        let text = self.session.input.draft.clone();
        self.send_message(&text).await
    }

    /// Send a chat message and wait for the reply
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        let exchange = match self.begin_send(text) {
            Ok(exchange) => exchange,
            Err(reason) => return SendOutcome::Skipped(reason),
        };

        let result = self
            .backend
            .chat(&exchange.user.id, &exchange.message)
            .await;
        self.complete_send(exchange, result)
    }

    /// Start a send: echo the message, clear the draft, show the placeholder
    ///
    /// # Errors
    ///
    /// - `NoUserSelected` (with a warning notification)
    /// - `EmptyMessage` when `text` is blank after trimming (silent)
    /// - `AlreadySending` while another exchange is outstanding (with a
    ///   warning notification)
    pub fn begin_send(&mut self, text: &str) -> Result<PendingExchange, SendRejected> {
        let Some(user) = self.session.selected_user.clone() else {
            self.notifier
                .notify(Notification::warning("Please select a user first"));
            return Err(SendRejected::NoUserSelected);
        };

        let message = text.trim();
        if message.is_empty() {
            return Err(SendRejected::EmptyMessage);
        }

        if self.session.pending_request() {
            self.notifier
                .notify(Notification::warning("Please wait for the current reply"));
            return Err(SendRejected::AlreadySending);
        }

        self.append(Message::user(user.name.clone(), message));
        self.session.input.draft.clear();
        self.publish_input();

        let placeholder = self.insert_placeholder();
        self.session.exchange = ExchangeState::Sending { placeholder };
        tracing::debug!("Exchange {} started for {}", placeholder, user.id);

        Ok(PendingExchange {
            user,
            message: message.to_string(),
            placeholder,
        })
    }

    fn insert_placeholder(&mut self) -> PlaceholderId {
        match self
            .session
            .transcript
            .insert_placeholder(self.assistant_name.clone())
        {
            Ok((id, change)) => {
                self.render(&change);
                id
            }
            // Left over from an abandoned exchange: adopt it rather than show two.
            Err(existing) => existing,
        }
    }

    /// Finish a send with the backend's result
    ///
    /// Removes the placeholder and appends exactly one assistant message.
    /// A completion for an exchange that is no longer current (the selection
    /// changed meanwhile) is discarded.
    pub fn complete_send(
        &mut self,
        exchange: PendingExchange,
        result: Result<String, ApiError>,
    ) -> SendOutcome {
        match self.session.exchange {
            ExchangeState::Sending { placeholder } if placeholder == exchange.placeholder => {}
            _ => {
                tracing::debug!(
                    "Discarding completion of abandoned exchange {}",
                    exchange.placeholder
                );
                return SendOutcome::Abandoned;
            }
        }

        self.session.exchange = ExchangeState::Idle;
        if let Some(change) = self
            .session
            .transcript
            .remove_placeholder(exchange.placeholder)
        {
            self.render(&change);
        }

        let assistant = self.assistant_name.clone();
        match result {
            Ok(reply) => {
                self.append(Message::assistant(assistant, reply));
                SendOutcome::Fulfilled
            }
            Err(ApiError::Rejected { status, .. }) => {
                tracing::warn!("Chat request rejected with status {}", status);
                self.append(Message::assistant(assistant, SERVER_ERROR_REPLY));
                SendOutcome::ServerRejected { status }
            }
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                self.append(Message::assistant(assistant, CONNECTION_ERROR_REPLY));
                self.notifier.notify(Notification::error("Connection error"));
                SendOutcome::ConnectionFailed
            }
        }
    }
}
