//! User directory client
//!
//! Holds the last fetched snapshot of users. The snapshot is only ever
//! replaced wholesale by a successful refresh; a failed refresh keeps the
//! previous one.

use crate::api::{Backend, User, UserId};
use crate::notify::{Notification, Notifier};

/// Outcome of [`UserDirectory::create`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The user was created (the directory was refreshed afterwards)
    Created(User),
    /// The name was empty after trimming; nothing was sent
    InvalidName,
    /// The backend refused or could not be reached
    Failed,
}

/// Snapshot of users known to the backend
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Look up a user by id in the current snapshot
    ///
    /// Ids are compared by their textual form, so `UserId::Int(1)` matches
    /// `UserId::Text("1")`.
    pub fn find(&self, id: &UserId) -> Option<&User> {
        let wanted = id.to_string();
        self.users.iter().find(|u| u.id.to_string() == wanted)
    }

    /// Replace the snapshot with the backend's current user list
    ///
    /// Returns `true` when the snapshot was replaced. On failure an error
    /// notification is emitted and the previous snapshot is kept.
    pub async fn refresh(&mut self, backend: &dyn Backend, notifier: &dyn Notifier) -> bool {
        match backend.list_users().await {
            Ok(users) => {
                tracing::debug!("Loaded {} users", users.len());
                self.users = users;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load users: {}", e);
                notifier.notify(Notification::error("Error loading users"));
                false
            }
        }
    }

    /// Create a user, then refresh the snapshot
    ///
    /// An empty (after trimming) name is rejected locally with a warning.
    /// Backend rejections surface the server's `detail` text when present.
    pub async fn create(
        &mut self,
        name: &str,
        backend: &dyn Backend,
        notifier: &dyn Notifier,
    ) -> CreateOutcome {
        let name = name.trim();
        if name.is_empty() {
            notifier.notify(Notification::warning("Please enter a user name"));
            return CreateOutcome::InvalidName;
        }

        match backend.create_user(name).await {
            Ok(user) => {
                tracing::info!("Created user {} ({})", user.name, user.id);
                notifier.notify(Notification::success(format!(
                    "User '{}' added successfully",
                    name
                )));
                self.refresh(backend, notifier).await;
                CreateOutcome::Created(user)
            }
            Err(e) => {
                tracing::warn!("Failed to create user {}: {}", name, e);
                let text = e.detail().unwrap_or("Error creating user").to_string();
                notifier.notify(Notification::error(text));
                CreateOutcome::Failed
            }
        }
    }
}
