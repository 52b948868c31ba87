//! Conversation transcript state
//!
//! A [`Transcript`] is the ordered list of messages shown for the current
//! session plus at most one pending placeholder (the "Thinking..." entry
//! shown while a reply is in flight). The placeholder is kept outside the
//! message list and addressed by [`PlaceholderId`], so removing it can never
//! touch a real message.
//!
//! Every mutation returns a [`TranscriptChange`] describing what happened;
//! the session controller forwards those to the view.

use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Assistant,
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name of the author
    pub sender: String,
    /// Message text; may span multiple lines
    pub content: String,
    pub origin: Origin,
}

impl Message {
    pub fn user(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            origin: Origin::User,
        }
    }

    pub fn assistant(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            origin: Origin::Assistant,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.origin == Origin::Assistant
    }
}

/// Identity of a pending placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderId(u64);

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pending-{}", self.0)
    }
}

/// The transient "reply in flight" entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub id: PlaceholderId,
    /// Name shown on the placeholder (the assistant)
    pub sender: String,
}

/// A single mutation of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptChange {
    Appended(Message),
    Cleared,
    PlaceholderInserted(Placeholder),
    PlaceholderRemoved(PlaceholderId),
}

/// Ordered message log with an optional pending placeholder
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    pending: Option<Placeholder>,
    next_placeholder: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The placeholder currently shown, if any
    pub fn pending(&self) -> Option<&Placeholder> {
        self.pending.as_ref()
    }

    pub fn append(&mut self, message: Message) -> TranscriptChange {
        self.messages.push(message.clone());
        TranscriptChange::Appended(message)
    }

    /// Drop every message and the placeholder
    pub fn clear(&mut self) -> TranscriptChange {
        self.messages.clear();
        self.pending = None;
        TranscriptChange::Cleared
    }

    /// Show the pending placeholder
    ///
    /// There is never more than one: when a placeholder is already shown,
    /// nothing changes and its id is returned as the error.
    pub fn insert_placeholder(
        &mut self,
        sender: impl Into<String>,
    ) -> Result<(PlaceholderId, TranscriptChange), PlaceholderId> {
        if let Some(existing) = &self.pending {
            return Err(existing.id);
        }

        self.next_placeholder += 1;
        let placeholder = Placeholder {
            id: PlaceholderId(self.next_placeholder),
            sender: sender.into(),
        };
        self.pending = Some(placeholder.clone());
        Ok((placeholder.id, TranscriptChange::PlaceholderInserted(placeholder)))
    }

    /// Remove the placeholder with the given identity
    ///
    /// A stale id (already removed, or cleared away) is a no-op.
    pub fn remove_placeholder(&mut self, id: PlaceholderId) -> Option<TranscriptChange> {
        match &self.pending {
            Some(p) if p.id == id => {
                self.pending = None;
                Some(TranscriptChange::PlaceholderRemoved(id))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut t = Transcript::new();
        t.append(Message::user("Alice", "hi"));
        t.append(Message::assistant("TodoBot", "hello"));

        assert_eq!(t.len(), 2);
        assert_eq!(t.messages()[0].content, "hi");
        assert!(t.messages()[1].is_assistant());
    }

    #[test]
    fn test_only_one_placeholder_at_a_time() {
        let mut t = Transcript::new();
        let (id, change) = t.insert_placeholder("TodoBot").unwrap();
        assert!(matches!(change, TranscriptChange::PlaceholderInserted(ref p) if p.id == id));
        assert_eq!(t.insert_placeholder("TodoBot").unwrap_err(), id);
        assert_eq!(t.pending().unwrap().id, id);
    }

    #[test]
    fn test_placeholder_is_not_a_message() {
        let mut t = Transcript::new();
        t.append(Message::user("Alice", "buy milk"));
        t.insert_placeholder("TodoBot").unwrap();
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_remove_placeholder_requires_matching_id() {
        let mut t = Transcript::new();
        let (first, _) = t.insert_placeholder("TodoBot").unwrap();
        assert_eq!(
            t.remove_placeholder(first),
            Some(TranscriptChange::PlaceholderRemoved(first))
        );

        let (second, _) = t.insert_placeholder("TodoBot").unwrap();
        assert_ne!(first, second);
        assert!(t.remove_placeholder(first).is_none());
        assert!(t.pending().is_some());
    }

    #[test]
    fn test_clear_drops_placeholder() {
        let mut t = Transcript::new();
        t.append(Message::user("Alice", "hi"));
        let (id, _) = t.insert_placeholder("TodoBot").unwrap();

        assert_eq!(t.clear(), TranscriptChange::Cleared);
        assert!(t.is_empty());
        assert!(t.pending().is_none());
        assert!(t.remove_placeholder(id).is_none());
    }

    #[test]
    fn test_multiline_content_kept_verbatim() {
        let mut t = Transcript::new();
        t.append(Message::assistant("TodoBot", "1. milk\n2. eggs"));
        assert_eq!(t.last().unwrap().content, "1. milk\n2. eggs");
    }
}
