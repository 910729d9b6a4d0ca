//! Prompt composition.
//!
//! The outbound prompt is the user's text followed, when anything is
//! attached, by a header line and one labelled block per attachment:
//!
//! ```text
//! Summarize these
//!
//!
//! Attached documents:
//!
//! [Attachment: notes.txt]
//! first note
//!
//! [Error: could not read attachment missing.txt]
//! ```
//!
//! An attachment that cannot be read degrades to an error marker; it never
//! aborts the composition.

use futures::future::join_all;

use crate::error::{Error, Result};
use crate::observability::ATTACHMENT_READ_ERRORS;
use crate::types::Attachment;

const ATTACHMENTS_HEADER: &str = "\n\nAttached documents:";

/// A composed prompt and the attachment reads that failed along the way.
#[derive(Debug, Clone)]
pub struct ComposedPrompt {
    /// The prompt to send.
    pub text: String,

    /// One [`Error::AttachmentRead`] per attachment that degraded to a marker.
    pub failures: Vec<Error>,
}

/// Returns true if there is nothing to send.
pub fn is_empty_input(text: &str, attachments: &[Attachment]) -> bool {
    text.trim().is_empty() && attachments.is_empty()
}

/// Combine user text and attachments into one prompt.
///
/// Attachments are read concurrently but appear in the order given.  Fails
/// only with [`Error::EmptyInput`], when there is no text and nothing
/// attached.
///
/// ```
/// # use nexus::Attachment;
/// # use nexus::prompt::compose;
/// # tokio_test::block_on(async {
/// let notes = Attachment::from_text("notes.txt", "buy milk");
/// let prompt = compose("What is on my list?", &[notes]).await.unwrap();
/// assert!(prompt.text.ends_with("[Attachment: notes.txt]\nbuy milk"));
/// # });
/// ```
pub async fn compose(text: &str, attachments: &[Attachment]) -> Result<ComposedPrompt> {
    if is_empty_input(text, attachments) {
        return Err(Error::EmptyInput);
    }
    if attachments.is_empty() {
        return Ok(ComposedPrompt {
            text: text.to_string(),
            failures: Vec::new(),
        });
    }

    let reads = join_all(attachments.iter().map(|a| a.read_text())).await;

    let mut parts = Vec::with_capacity(attachments.len() + 2);
    parts.push(text.to_string());
    parts.push(ATTACHMENTS_HEADER.to_string());
    let mut failures = Vec::new();
    for (attachment, read) in attachments.iter().zip(reads) {
        match read {
            Ok(content) => parts.push(attachment_block(attachment.name(), &content)),
            Err(err) => {
                ATTACHMENT_READ_ERRORS.click();
                parts.push(error_block(attachment.name()));
                failures.push(err);
            }
        }
    }

    Ok(ComposedPrompt {
        text: parts.join("\n"),
        failures,
    })
}

fn attachment_block(name: &str, content: &str) -> String {
    format!("\n[Attachment: {name}]\n{content}")
}

fn error_block(name: &str) -> String {
    format!("\n[Error: could not read attachment {name}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_only_is_unchanged() {
        let prompt = compose("Hello", &[]).await.unwrap();
        assert_eq!(prompt.text, "Hello");
        assert!(prompt.failures.is_empty());
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        assert!(compose("", &[]).await.unwrap_err().is_empty_input());
        assert!(compose("  \n\t", &[]).await.unwrap_err().is_empty_input());
        assert!(is_empty_input(" ", &[]));
        assert!(!is_empty_input("", &[Attachment::from_text("a", "")]));
    }

    #[tokio::test]
    async fn attachments_follow_the_header_in_order() {
        let attachments = vec![
            Attachment::from_text("a.txt", "alpha"),
            Attachment::from_text("b.txt", "beta"),
        ];
        let prompt = compose("Compare", &attachments).await.unwrap();
        assert_eq!(
            prompt.text,
            "Compare\n\n\nAttached documents:\n\n[Attachment: a.txt]\nalpha\n\n[Attachment: b.txt]\nbeta"
        );
    }

    #[tokio::test]
    async fn attachments_without_text() {
        let attachments = vec![Attachment::from_text("a.txt", "alpha")];
        let prompt = compose("", &attachments).await.unwrap();
        assert_eq!(
            prompt.text,
            "\n\n\nAttached documents:\n\n[Attachment: a.txt]\nalpha"
        );
    }

    #[tokio::test]
    async fn unreadable_attachment_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let attachments = vec![
            Attachment::from_text("first.txt", "one"),
            Attachment::from_path(missing.to_str().unwrap()),
            Attachment::from_text("third.txt", "three"),
        ];

        let prompt = compose("Read these", &attachments).await.unwrap();
        assert!(prompt.text.contains("[Attachment: first.txt]\none"));
        assert!(prompt.text.contains("[Error: could not read attachment missing.txt]"));
        assert!(prompt.text.contains("[Attachment: third.txt]\nthree"));
        let first = prompt.text.find("first.txt").unwrap();
        let missing = prompt.text.find("missing.txt").unwrap();
        let third = prompt.text.find("third.txt").unwrap();
        assert!(first < missing && missing < third);

        assert_eq!(prompt.failures.len(), 1);
        assert!(prompt.failures[0].is_attachment_read());
    }

    #[tokio::test]
    async fn deterministic() {
        let attachments = vec![Attachment::from_text("a.txt", "alpha")];
        let first = compose("Same", &attachments).await.unwrap();
        let second = compose("Same", &attachments).await.unwrap();
        assert_eq!(first.text, second.text);
    }
}
