//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction that allows
//! for different output styles.  The default implementation writes to the
//! terminal with optional ANSI styling.

use std::io::{self, Stdout, Write};

use crate::notify::{NoticeKind, Notifier};
use crate::types::Message;

/// ANSI escape code for dim text (used for timestamps).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for assistant labels).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for magenta text (used for user labels).
const ANSI_MAGENTA: &str = "\x1b[35m";

/// ANSI escape code for yellow text (used for warnings and attachments).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (used for successes).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording renderers in tests
pub trait Renderer: Send {
    /// Print a chunk of response text.
    ///
    /// Called once with the whole reply for a non-streaming send, or once per
    /// delta as they arrive.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a whole stored message, e.g. when replaying history.
    fn print_message(&mut self, message: &Message);

    /// Called when a response is complete, successfully or not.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    mid_line: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            mid_line: false,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_color {
            format!("{color}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn break_line(&mut self) {
        if self.mid_line {
            println!();
            self.mid_line = false;
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_text(&mut self, text: &str) {
        print!("{text}");
        self.mid_line = !text.ends_with('\n');
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.break_line();
        eprintln!("{}", self.paint(ANSI_RED, &format!("Error: {error}")));
    }

    fn print_info(&mut self, info: &str) {
        self.break_line();
        println!("{info}");
    }

    fn print_message(&mut self, message: &Message) {
        self.break_line();
        let (label, color) = if message.is_user {
            ("You", ANSI_MAGENTA)
        } else {
            ("Assistant", ANSI_CYAN)
        };
        let stamp = message_time(message);
        println!(
            "{} {}",
            self.paint(color, &format!("{label}:")),
            self.paint(ANSI_DIM, &stamp)
        );
        for attachment in &message.attachments {
            println!(
                "{}",
                self.paint(ANSI_YELLOW, &format!("  [attached: {}]", attachment.name()))
            );
        }
        println!("{}", message.text);
        self.flush();
    }

    fn finish_response(&mut self) {
        self.break_line();
        self.flush();
    }
}

impl Notifier for PlainTextRenderer {
    fn notify(&mut self, kind: NoticeKind, title: &str, detail: &str) {
        self.break_line();
        let color = match kind {
            NoticeKind::Info => ANSI_CYAN,
            NoticeKind::Success => ANSI_GREEN,
            NoticeKind::Warning => ANSI_YELLOW,
            NoticeKind::Error => ANSI_RED,
        };
        let headline = self.paint(color, &format!("[{kind}] {title}"));
        match kind {
            NoticeKind::Warning | NoticeKind::Error => {
                eprintln!("{headline}");
                if !detail.is_empty() {
                    eprintln!("{detail}");
                }
            }
            NoticeKind::Info | NoticeKind::Success => {
                println!("{headline}");
                if !detail.is_empty() {
                    println!("{detail}");
                }
            }
        }
        self.flush();
    }
}

/// `HH:MM` in the message's own offset.
fn message_time(message: &Message) -> String {
    let at = message.timestamp;
    format!("{:02}:{:02}", at.hour(), at.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
        assert_eq!(renderer.paint(ANSI_RED, "plain"), "plain");
    }

    #[test]
    fn message_time_is_hours_and_minutes() {
        let message = Message::assistant("Hi", datetime!(2025-01-30 09:05:59 UTC));
        assert_eq!(message_time(&message), "09:05");
    }

    #[test]
    fn text_tracks_line_state() {
        let mut renderer = PlainTextRenderer::with_color(false);
        renderer.print_text("partial");
        assert!(renderer.mid_line);
        renderer.finish_response();
        assert!(!renderer.mid_line);
    }
}
