//! TodoBot - terminal chat client library
//!
//! This library provides a headless chat-session controller for a to-do
//! assistant backend reachable over HTTP. An operator picks a user, sends
//! messages, and sees the assistant's replies; the backend stores users and
//! conversation history.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Backend trait, wire types, and the HTTP implementation
//! - `session`: Session state and the controller that drives it
//! - `directory`: Snapshot of users known to the backend
//! - `transcript`: Ordered messages plus the pending-reply placeholder
//! - `todos`: Read-only to-do list of a user
//! - `view`: Rendering seam and the console/headless views
//! - `notify`: Transient status notifications
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers for each CLI command
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use todobot::api::HttpBackend;
//! use todobot::notify::NotificationLog;
//! use todobot::view::HeadlessView;
//! use todobot::{Config, SessionController};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.backend)?);
//!     let mut controller = SessionController::new(
//!         backend,
//!         Arc::new(NotificationLog::new()),
//!         Arc::new(HeadlessView::new()),
//!         &config.ui,
//!     );
//!     controller.start().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod directory;
pub mod error;
pub mod notify;
pub mod session;
pub mod todos;
pub mod transcript;
pub mod view;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Result, TodobotError};
pub use session::SessionController;
