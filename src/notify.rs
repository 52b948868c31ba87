//! Operator notifications
//!
//! Notifications are short status lines ("Selected user: Alice",
//! "Connection error") shown next to the transcript. They are
//! fire-and-forget: emitting one never blocks and never fails. Only one is
//! visible at a time; a new notification replaces the current one, and a
//! notification disappears on its own once its display duration elapses.

use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use colored::Colorize;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single status message for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, text)
    }

    fn new(level: NotificationLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Colored single-line rendering for the terminal
    pub fn colored_line(&self) -> String {
        let tag = format!("[{}]", self.level);
        let tag = match self.level {
            NotificationLevel::Info => tag.blue(),
            NotificationLevel::Success => tag.green(),
            NotificationLevel::Warning => tag.yellow(),
            NotificationLevel::Error => tag.red(),
        };
        format!("{} {}", tag, self.text)
    }
}

/// Sink for operator notifications
pub trait Notifier: Send + Sync {
    /// Show a notification, replacing whatever is currently visible
    fn notify(&self, notification: Notification);
}

/// The single visible notification and when it was shown
#[derive(Debug)]
struct Slot {
    current: Option<(Notification, Instant)>,
    duration: Duration,
}

impl Slot {
    fn new(duration: Duration) -> Self {
        Self {
            current: None,
            duration,
        }
    }

    fn show(&mut self, notification: Notification, now: Instant) {
        self.current = Some((notification, now));
    }

    fn visible(&self, now: Instant) -> Option<Notification> {
        self.current.as_ref().and_then(|(n, shown_at)| {
            (now.saturating_duration_since(*shown_at) < self.duration).then(|| n.clone())
        })
    }
}

/// Notifier that prints to stderr
///
/// Printing happens immediately. The currently visible notification is
/// tracked so the REPL prompt can reflect it until it expires.
#[derive(Debug)]
pub struct ConsoleNotifier {
    slot: Mutex<Slot>,
}

impl ConsoleNotifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            slot: Mutex::new(Slot::new(duration)),
        }
    }

    /// The notification still on screen, if it has not expired
    pub fn visible(&self) -> Option<Notification> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.visible(Instant::now()))
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", notification.colored_line());
        if let Ok(mut slot) = self.slot.lock() {
            slot.show(notification, Instant::now());
        }
    }
}

/// Notifier that keeps every notification in memory
///
/// Used for headless sessions (one-shot CLI commands, tests) where nothing
/// is drawn but the outcome still needs inspecting.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications emitted so far, oldest first
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Most recent notification, i.e. the one that would be visible
    pub fn last(&self) -> Option<Notification> {
        self.entries.lock().ok().and_then(|e| e.last().cloned())
    }

    /// Number of notifications at the given level
    pub fn count(&self, level: NotificationLevel) -> usize {
        self.entries
            .lock()
            .map(|e| e.iter().filter(|n| n.level == level).count())
            .unwrap_or(0)
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        tracing::debug!("notification [{}]: {}", notification.level, notification.text);
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(notification);
        }
    }
}
