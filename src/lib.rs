// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod ndjson;
pub mod notify;
pub mod prompt;
pub mod render;
pub mod store;
pub mod transcript;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use client::{DEFAULT_MODEL, GenerationStream, Generator, Ollama};
pub use client_logger::ClientLogger;
pub use error::{Error, ImportErrorKind, Result};
pub use notify::{Notice, NoticeKind, Notifier};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use store::{SessionStore, Snapshot};
pub use types::*;
