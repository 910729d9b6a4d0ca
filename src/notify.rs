//! User-facing notifications.
//!
//! Session operations return results; whoever drives the session decides how
//! to tell the user.  [`Notifier`] is that narrow seam.

use std::fmt;

use crate::Error;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Neutral information.
    Info,
    /// An operation succeeded.
    Success,
    /// Something degraded but the operation continued.
    Warning,
    /// An operation failed.
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Info => write!(f, "info"),
            NoticeKind::Success => write!(f, "success"),
            NoticeKind::Warning => write!(f, "warning"),
            NoticeKind::Error => write!(f, "error"),
        }
    }
}

/// One notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Short headline.
    pub title: String,
    /// Longer explanation; may span lines.
    pub detail: String,
}

/// Receives notifications.
pub trait Notifier {
    /// Show one notification.
    fn notify(&mut self, kind: NoticeKind, title: &str, detail: &str);
}

/// Collects notifications in order.
impl Notifier for Vec<Notice> {
    fn notify(&mut self, kind: NoticeKind, title: &str, detail: &str) {
        self.push(Notice {
            kind,
            title: title.to_string(),
            detail: detail.to_string(),
        });
    }
}

/// Report a failed send, with hints for the usual causes.
pub fn notify_send_error(notifier: &mut dyn Notifier, err: &Error) {
    let mut detail = err.to_string();
    if err.is_generation() {
        detail.push_str(
            "\n  - Check that the Ollama server is running (ollama serve)\
             \n  - Check that the model is installed (ollama list)\
             \n  - Try again later",
        );
    }
    notifier.notify(NoticeKind::Error, "Failed to generate a response", &detail);
}

/// Warn about every attachment that degraded to an error marker.
pub fn notify_attachment_failures(notifier: &mut dyn Notifier, failures: &[Error]) {
    for failure in failures {
        notifier.notify(
            NoticeKind::Warning,
            "Attachment skipped",
            &failure.to_string(),
        );
    }
}

/// Warn that the server did not answer the health check.
pub fn notify_server_unreachable(notifier: &mut dyn Notifier, model: &str, err: &Error) {
    let detail = format!(
        "{err}\nRun in a terminal:\n  ollama serve\nMake sure the model is installed:\n  ollama run {model}"
    );
    notifier.notify(NoticeKind::Warning, "Ollama not detected", &detail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_errors_get_hints() {
        let mut notices = Vec::new();
        notify_send_error(&mut notices, &Error::connection("refused", None));
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert!(notices[0].detail.contains("ollama serve"));
    }

    #[test]
    fn other_errors_have_no_hints() {
        let mut notices = Vec::new();
        notify_send_error(&mut notices, &Error::EmptyInput);
        assert!(!notices[0].detail.contains("ollama serve"));
    }

    #[test]
    fn one_warning_per_attachment_failure() {
        let mut notices = Vec::new();
        let failures = vec![
            Error::attachment_read("a.txt", "missing"),
            Error::attachment_read("b.bin", "not UTF-8 text"),
        ];
        notify_attachment_failures(&mut notices, &failures);
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.kind == NoticeKind::Warning));
        assert!(notices[1].detail.contains("b.bin"));
    }

    #[test]
    fn unreachable_server_names_the_model() {
        let mut notices = Vec::new();
        notify_server_unreachable(
            &mut notices,
            "deepseek-r1:8b",
            &Error::connection("refused", None),
        );
        assert!(notices[0].detail.contains("ollama run deepseek-r1:8b"));
    }
}
