//! Logging trait for generation client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all traffic passing through the [`Ollama`](crate::Ollama) client.

use crate::{GenerateRequest, GenerateResponse, GenerationEvent};

/// A trait for logging generation client operations.
///
/// Install one with [`Ollama::with_logger`](crate::Ollama::with_logger).
///
/// # Example
///
/// ```rust,ignore
/// use nexus::{ClientLogger, GenerateRequest, GenerateResponse, GenerationEvent};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, request: &GenerateRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &GenerateResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_stream_event(&self, event: &GenerationEvent) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Stream event: {event:?}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &GenerateRequest);

    /// Log the complete response of a non-streaming call.
    fn log_response(&self, response: &GenerateResponse);

    /// Log one event of a streaming call, in arrival order.
    fn log_stream_event(&self, event: &GenerationEvent);
}
