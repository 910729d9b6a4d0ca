use time::OffsetDateTime;

use crate::types::Attachment;

/// One entry in a conversation.
///
/// Messages are created by the session store, which assigns the timestamp.
/// Equality compares every field, attachments included; the store itself
/// never deduplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The displayed content.
    pub text: String,

    /// True if the human wrote it, false if the model generated it.
    pub is_user: bool,

    /// When the message entered the session.
    pub timestamp: OffsetDateTime,

    /// Documents attached to a user message; always empty for the model.
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Create a user-authored message.
    pub fn user(
        text: impl Into<String>,
        attachments: Vec<Attachment>,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            timestamp,
            attachments,
        }
    }

    /// Create a model-authored message.
    pub fn assistant(text: impl Into<String>, timestamp: OffsetDateTime) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            timestamp,
            attachments: Vec::new(),
        }
    }

    /// True if the model generated this message.
    pub fn is_assistant(&self) -> bool {
        !self.is_user
    }

    /// A copy with attachments removed.
    pub fn without_attachments(&self) -> Self {
        Self {
            text: self.text.clone(),
            is_user: self.is_user,
            timestamp: self.timestamp,
            attachments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn assistant_messages_have_no_attachments() {
        let message = Message::assistant("Hi there", datetime!(2025-01-30 14:05 UTC));
        assert!(message.is_assistant());
        assert!(message.attachments.is_empty());
    }

    #[test]
    fn without_attachments_keeps_everything_else() {
        let at = datetime!(2025-01-30 14:05 UTC);
        let message = Message::user("Read this", vec![Attachment::from_text("a.txt", "a")], at);
        let stripped = message.without_attachments();
        assert_eq!(stripped.text, "Read this");
        assert!(stripped.is_user);
        assert_eq!(stripped.timestamp, at);
        assert!(stripped.attachments.is_empty());
    }
}
