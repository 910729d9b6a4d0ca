//! Error types for the Nexus chat client.
//!
//! This module defines the error taxonomy shared by the generation client, the
//! prompt composer, the session store, and the transcript codec.  Every error
//! is recovered at the boundary of the operation that raised it (send, import,
//! export) and none of them leave the session store half-modified.

use std::error;
use std::fmt;
use std::io;
use std::str::Utf8Error;
use std::sync::Arc;

/// Why an import was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportErrorKind {
    /// The document is not parseable JSON.
    MalformedJson,
    /// The document parsed but lacks a required field or has the wrong shape.
    InvalidSchema,
}

impl fmt::Display for ImportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportErrorKind::MalformedJson => write!(f, "malformed JSON"),
            ImportErrorKind::InvalidSchema => write!(f, "invalid schema"),
        }
    }
}

/// The main error type for the Nexus crate.
#[derive(Clone, Debug)]
pub enum Error {
    /// The generation endpoint returned a non-success status.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Human-readable error message.
        message: String,
    },

    /// Bad request due to invalid parameters.
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found; usually a model that has not been pulled.
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Request timeout.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error; usually the local server is not running.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Server returned a 500 internal error.
    InternalServer {
        /// Human-readable error message.
        message: String,
    },

    /// Server is overloaded or unavailable.
    ServiceUnavailable {
        /// Human-readable error message.
        message: String,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A streaming error occurred, including a stream that closed early.
    Streaming {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Encoding/decoding error.
    Encoding {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// An attachment could not be read.
    AttachmentRead {
        /// Display name of the attachment.
        name: String,
        /// Human-readable error message.
        message: String,
    },

    /// A transcript could not be imported.
    Import {
        /// The class of failure.
        kind: ImportErrorKind,
        /// Human-readable error message.
        message: String,
    },

    /// A transcript could not be exported.
    Export {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A send was attempted with no text and no attachments.
    EmptyInput,

    /// An operation was applied to the session store in a state that forbids it.
    InvalidState {
        /// Human-readable error message.
        message: String,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new API error.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new internal server error.
    pub fn internal_server(message: impl Into<String>) -> Self {
        Error::InternalServer {
            message: message.into(),
        }
    }

    /// Creates a new service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Error::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new streaming error.
    pub fn streaming(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Streaming {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates the error reported when a stream closes before its completion signal.
    pub fn truncated_stream() -> Self {
        Error::streaming("stream closed before the response was complete", None)
    }

    /// Creates a new encoding error.
    pub fn encoding(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Encoding {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new attachment read error.
    pub fn attachment_read(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::AttachmentRead {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new import error.
    pub fn import(kind: ImportErrorKind, message: impl Into<String>) -> Self {
        Error::Import {
            kind,
            message: message.into(),
        }
    }

    /// Creates an import error for a document that is not JSON.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::import(ImportErrorKind::MalformedJson, message)
    }

    /// Creates an import error for a document with the wrong shape.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::import(ImportErrorKind::InvalidSchema, message)
    }

    /// Creates a new export error.
    pub fn export(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Export {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState {
            message: message.into(),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns true if this error came from the generation endpoint or its transport.
    pub fn is_generation(&self) -> bool {
        matches!(
            self,
            Error::Api { .. }
                | Error::BadRequest { .. }
                | Error::NotFound { .. }
                | Error::Timeout { .. }
                | Error::Connection { .. }
                | Error::InternalServer { .. }
                | Error::ServiceUnavailable { .. }
                | Error::HttpClient { .. }
                | Error::Streaming { .. }
                | Error::Encoding { .. }
        )
    }

    /// Returns true if this error is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if this error is a streaming error.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Error::Streaming { .. })
    }

    /// Returns true if this error is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Error::InternalServer { .. } | Error::ServiceUnavailable { .. }
        )
    }

    /// Returns true if this error is an attachment read error.
    pub fn is_attachment_read(&self) -> bool {
        matches!(self, Error::AttachmentRead { .. })
    }

    /// Returns the import failure class, if this is an import error.
    pub fn import_kind(&self) -> Option<ImportErrorKind> {
        match self {
            Error::Import { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns true if this error is an export error.
    pub fn is_export(&self) -> bool {
        matches!(self, Error::Export { .. })
    }

    /// Returns true if this error rejected an empty send.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Error::EmptyInput)
    }

    /// Returns true if this error is an invalid state error.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            Error::BadRequest { .. } => Some(400),
            Error::NotFound { .. } => Some(404),
            Error::InternalServer { .. } => Some(500),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api {
                status_code,
                message,
            } => {
                write!(f, "API error ({status_code}): {message}")
            }
            Error::BadRequest { message } => {
                write!(f, "Bad request: {message}")
            }
            Error::NotFound { message } => {
                write!(f, "Not found: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::InternalServer { message } => {
                write!(f, "Internal server error: {message}")
            }
            Error::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Streaming { message, .. } => {
                write!(f, "Streaming error: {message}")
            }
            Error::Encoding { message, .. } => {
                write!(f, "Encoding error: {message}")
            }
            Error::AttachmentRead { name, message } => {
                write!(f, "Could not read attachment {name}: {message}")
            }
            Error::Import { kind, message } => {
                write!(f, "Import failed ({kind}): {message}")
            }
            Error::Export { message, .. } => {
                write!(f, "Export failed: {message}")
            }
            Error::EmptyInput => {
                write!(f, "Nothing to send: type a message or attach a file")
            }
            Error::InvalidState { message } => {
                write!(f, "Invalid state: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. }
            | Error::HttpClient { source, .. }
            | Error::Streaming { source, .. }
            | Error::Encoding { source, .. }
            | Error::Export { source, .. }
            | Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::encoding(format!("UTF-8 error: {err}"), Some(Box::new(err)))
    }
}

/// A specialized Result type for Nexus operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_errors_are_grouped() {
        assert!(Error::api(418, "teapot").is_generation());
        assert!(Error::connection("refused", None).is_generation());
        assert!(Error::truncated_stream().is_generation());
        assert!(!Error::EmptyInput.is_generation());
        assert!(!Error::malformed_json("x").is_generation());
        assert!(!Error::attachment_read("a.txt", "gone").is_generation());
    }

    #[test]
    fn import_kind() {
        assert_eq!(
            Error::malformed_json("bad").import_kind(),
            Some(ImportErrorKind::MalformedJson)
        );
        assert_eq!(
            Error::invalid_schema("bad").import_kind(),
            Some(ImportErrorKind::InvalidSchema)
        );
        assert_eq!(Error::export("disk full", None).import_kind(), None);
    }

    #[test]
    fn display() {
        assert_eq!(
            Error::api(418, "teapot").to_string(),
            "API error (418): teapot"
        );
        assert_eq!(
            Error::invalid_schema("missing field `messages`").to_string(),
            "Import failed (invalid schema): missing field `messages`"
        );
        assert_eq!(
            Error::attachment_read("notes.txt", "not found").to_string(),
            "Could not read attachment notes.txt: not found"
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(Error::not_found("model").status_code(), Some(404));
        assert_eq!(Error::api(502, "bad gateway").status_code(), Some(502));
        assert_eq!(Error::truncated_stream().status_code(), None);
    }

    #[test]
    fn io_source_is_exposed() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(error::Error::source(&err).is_some());
    }
}
