//! The ordered message list behind a chat session.
//!
//! Index order is display order and causal order: a user message always sits
//! before the assistant reply it produced.  Timestamps never decrease along
//! the list.  The store is single-writer; the owning session holds it by
//! value and every mutation takes `&mut self`.

use std::ops::Deref;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::types::{Attachment, Message};

/// An immutable copy of the store's messages at one point in time.
///
/// Later mutations of the store never show through a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<[Message]>);

impl Snapshot {
    /// The messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.0
    }
}

impl Deref for Snapshot {
    type Target = [Message];

    fn deref(&self) -> &[Message] {
        &self.0
    }
}

/// In-memory conversation history.
#[derive(Debug, Default)]
pub struct SessionStore {
    messages: Vec<Message>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The tail message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Append a message at the end.  Never fails.
    ///
    /// A timestamp older than the tail's is raised to the tail's.
    pub fn append(&mut self, mut message: Message) {
        if let Some(tail) = self.messages.last()
            && message.timestamp < tail.timestamp
        {
            message.timestamp = tail.timestamp;
        }
        self.messages.push(message);
    }

    /// Create, stamp and append a user message.
    pub fn push_user(&mut self, text: impl Into<String>, attachments: Vec<Attachment>) -> &Message {
        let message = Message::user(text, attachments, self.next_timestamp());
        self.push(message)
    }

    /// Create, stamp and append an assistant message.
    pub fn push_assistant(&mut self, text: impl Into<String>) -> &Message {
        let message = Message::assistant(text, self.next_timestamp());
        self.push(message)
    }

    /// Replace the text of the tail message, which must be assistant-authored.
    ///
    /// Position, timestamp and authorship are unchanged.  On an empty store
    /// or a user-authored tail this fails and changes nothing.
    pub fn replace_assistant_tail(&mut self, text: impl Into<String>) -> Result<()> {
        let tail = self.assistant_tail_mut("replace the assistant tail")?;
        tail.text = text.into();
        Ok(())
    }

    /// Append `delta` to the text of the assistant tail.
    ///
    /// Equivalent to `replace_assistant_tail(tail.text + delta)`.
    pub fn extend_assistant_tail(&mut self, delta: &str) -> Result<()> {
        let tail = self.assistant_tail_mut("extend the assistant tail")?;
        tail.text.push_str(delta);
        Ok(())
    }

    /// Remove and return the tail message, which must be assistant-authored.
    pub fn pop_assistant_tail(&mut self) -> Result<Message> {
        self.assistant_tail_mut("remove the assistant tail")?;
        self.messages
            .pop()
            .ok_or_else(|| Error::invalid_state("cannot remove the assistant tail: store is empty"))
    }

    /// Discard everything and adopt `messages` as-is.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Remove every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Copy the current messages.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(Arc::from(self.messages.as_slice()))
    }

    fn push(&mut self, message: Message) -> &Message {
        self.append(message);
        // append never fails, so the tail is the message just pushed
        &self.messages[self.messages.len() - 1]
    }

    fn next_timestamp(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        match self.messages.last() {
            Some(tail) if tail.timestamp > now => tail.timestamp,
            _ => now,
        }
    }

    fn assistant_tail_mut(&mut self, action: &str) -> Result<&mut Message> {
        match self.messages.last_mut() {
            None => Err(Error::invalid_state(format!(
                "cannot {action}: store is empty"
            ))),
            Some(tail) if tail.is_user => Err(Error::invalid_state(format!(
                "cannot {action}: tail message is user-authored"
            ))),
            Some(tail) => Ok(tail),
        }
    }
}
