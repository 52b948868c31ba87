//! Read-only view of a user's to-do list
//!
//! The assistant creates and completes items through the chat; the client
//! only reads them back. Items and counts come from two endpoints that are
//! queried concurrently and reported together.

use serde::Serialize;

use crate::api::{Backend, Todo, TodoStats, User};
use crate::notify::{Notification, Notifier};

/// A user's to-do items with their counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoList {
    pub user: User,
    pub items: Vec<Todo>,
    pub stats: TodoStats,
}

/// Fetch the to-do list of `user`
///
/// Returns `None` after an error notification when either request fails;
/// a server `detail` (e.g. "User not found") is shown when present.
pub async fn fetch(backend: &dyn Backend, notifier: &dyn Notifier, user: &User) -> Option<TodoList> {
    let (items, stats) = tokio::join!(backend.todos(&user.id), backend.todo_stats(&user.id));

    match items.and_then(|items| stats.map(|stats| (items, stats))) {
        Ok((items, stats)) => {
            tracing::debug!("Loaded {} todos for {}", items.len(), user.id);
            Some(TodoList {
                user: user.clone(),
                items,
                stats,
            })
        }
        Err(e) => {
            tracing::warn!("Failed to load todos for {}: {}", user.id, e);
            let text = e.detail().unwrap_or("Error loading todos").to_string();
            notifier.notify(Notification::error(text));
            None
        }
    }
}
