//! Backend API abstraction and wire types
//!
//! This module defines the [`Backend`] trait the session controller talks
//! to, plus the JSON shapes exchanged with the TodoBot server:
//!
//! - `GET  /api/users` -- list users
//! - `POST /api/users` -- create a user
//! - `GET  /api/users/{id}/conversations` -- ordered conversation history
//! - `POST /api/users/{id}/chat` -- send a message, receive the reply
//! - `GET  /api/users/{id}/todos` -- the user's to-do items
//! - `GET  /api/users/{id}/todos/stats` -- completed/pending counts
//!
//! Concrete implementations live in submodules:
//!
//! - [`http::HttpBackend`] -- reqwest client against a real server
//! - `fake::FakeBackend` -- scripted in-process backend (cfg(test) only)
//!
//! Every call returns `Result<T, ApiError>` so callers can branch on the
//! failure category instead of inspecting error strings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpBackend;

/// Server-assigned user identifier
///
/// Opaque to the client. The reference server uses integers, but any JSON
/// string or integer round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    /// Numeric identifier
    Int(i64),
    /// Textual identifier
    Text(String),
}

impl UserId {
    /// Parse an identifier typed by the operator
    ///
    /// # Examples
    ///
    /// ```
    /// use todobot::api::UserId;
    ///
    /// assert_eq!(UserId::parse("42"), UserId::Int(42));
    /// assert_eq!(UserId::parse(" abc "), UserId::Text("abc".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(s.to_string()),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// A user known to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable server-assigned identifier
    pub id: UserId,
    /// Display name
    pub name: String,
}

impl User {
    /// Create a user record
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One entry of a user's stored conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// `"assistant"` for bot turns; anything else is a user turn
    pub role: String,
    /// Message text
    pub content: String,
}

impl ConversationRecord {
    /// True when this record was produced by the assistant
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}

/// One to-do item kept by the assistant for a user
///
/// Timestamps are passed through as the server formats them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub completed: bool,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Counts returned by `GET /api/users/{id}/todos/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Body of `POST /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Name of the user to create
    pub name: String,
}

/// Body of `POST /api/users/{id}/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Id of the user sending the message
    pub user_id: UserId,
    /// Message text
    pub message: String,
}

/// Success body of `POST /api/users/{id}/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply
    pub response: String,
}

/// Client for the TodoBot backend
///
/// Implementations must never panic on bad responses; every failure is
/// reported as an [`ApiError`] in the matching category.
#[async_trait::async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    /// Fetch all users, in server order
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// Create a user with the given name
    async fn create_user(&self, name: &str) -> Result<User, ApiError>;

    /// Fetch the ordered conversation history of a user
    async fn conversation_history(&self, user: &UserId)
        -> Result<Vec<ConversationRecord>, ApiError>;

    /// Send a chat message on behalf of a user and return the reply text
    async fn chat(&self, user: &UserId, message: &str) -> Result<String, ApiError>;

    /// Fetch a user's to-do items, in server order
    async fn todos(&self, user: &UserId) -> Result<Vec<Todo>, ApiError>;

    /// Fetch a user's to-do counts
    async fn todo_stats(&self, user: &UserId) -> Result<TodoStats, ApiError>;
}
