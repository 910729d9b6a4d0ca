//! Chat application module for interactive conversations with a local model.
//!
//! This module provides a REPL chat interface built on top of the nexus
//! client library. It supports:
//!
//! - Streaming responses with real-time token display
//! - Text file attachments folded into the prompt
//! - Transcript export and import
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and generation calls
//! - [`commands`]: Slash command parsing and help text

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command, setup_text};
pub use config::{ChatArgs, ChatArgsError, ChatConfig};
pub use session::{ChatSession, SendOutcome, SessionStats};
