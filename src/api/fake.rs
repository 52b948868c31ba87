//! Scripted in-process backend for unit tests
//!
//! [`FakeBackend`] answers each endpoint from a queue of canned results and
//! records every call it receives, so tests can assert both on controller
//! state and on the exact traffic that would have hit the server. An empty
//! queue answers with a transport error.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::{Backend, ConversationRecord, Todo, TodoStats, User, UserId};
use crate::error::ApiError;

/// A call observed by [`FakeBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    ListUsers,
    CreateUser(String),
    History(UserId),
    Chat(UserId, String),
    Todos(UserId),
    TodoStats(UserId),
}

#[derive(Debug, Default)]
struct Script {
    users: VecDeque<Result<Vec<User>, ApiError>>,
    created: VecDeque<Result<User, ApiError>>,
    history: VecDeque<Result<Vec<ConversationRecord>, ApiError>>,
    chat: VecDeque<Result<String, ApiError>>,
    todos: VecDeque<Result<Vec<Todo>, ApiError>>,
    stats: VecDeque<Result<TodoStats, ApiError>>,
    calls: Vec<FakeCall>,
}

/// Backend double with per-endpoint response queues
#[derive(Debug, Default)]
pub struct FakeBackend {
    script: Mutex<Script>,
}

fn unscripted() -> ApiError {
    ApiError::Transport("no scripted response".to_string())
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_users(&self, result: Result<Vec<User>, ApiError>) -> &Self {
        self.script.lock().unwrap().users.push_back(result);
        self
    }

    pub fn push_created(&self, result: Result<User, ApiError>) -> &Self {
        self.script.lock().unwrap().created.push_back(result);
        self
    }

    pub fn push_history(&self, result: Result<Vec<ConversationRecord>, ApiError>) -> &Self {
        self.script.lock().unwrap().history.push_back(result);
        self
    }

    pub fn push_chat(&self, result: Result<String, ApiError>) -> &Self {
        self.script.lock().unwrap().chat.push_back(result);
        self
    }

    pub fn push_todos(&self, result: Result<Vec<Todo>, ApiError>) -> &Self {
        self.script.lock().unwrap().todos.push_back(result);
        self
    }

    pub fn push_stats(&self, result: Result<TodoStats, ApiError>) -> &Self {
        self.script.lock().unwrap().stats.push_back(result);
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<FakeCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn chat_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, FakeCall::Chat(..)))
            .count()
    }
}

/// Shorthand for a to-do item
pub fn todo(id: i64, task: &str, completed: bool) -> Todo {
    Todo {
        id,
        task: task.to_string(),
        completed,
        created_at: "2024-01-01T09:00:00".to_string(),
        completed_at: completed.then(|| "2024-01-02T09:00:00".to_string()),
    }
}

/// Shorthand for a history record
pub fn record(role: &str, content: &str) -> ConversationRecord {
    ConversationRecord {
        role: role.to_string(),
        content: content.to_string(),
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(FakeCall::ListUsers);
        script.users.pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn create_user(&self, name: &str) -> Result<User, ApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(FakeCall::CreateUser(name.to_string()));
        script.created.pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn conversation_history(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationRecord>, ApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(FakeCall::History(user.clone()));
        script.history.pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn chat(&self, user: &UserId, message: &str) -> Result<String, ApiError> {
        let mut script = self.script.lock().unwrap();
        script
            .calls
            .push(FakeCall::Chat(user.clone(), message.to_string()));
        script.chat.pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn todos(&self, user: &UserId) -> Result<Vec<Todo>, ApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(FakeCall::Todos(user.clone()));
        script.todos.pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn todo_stats(&self, user: &UserId) -> Result<TodoStats, ApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(FakeCall::TodoStats(user.clone()));
        script.stats.pop_front().unwrap_or_else(|| Err(unscripted()))
    }
}
