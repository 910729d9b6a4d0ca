//! Transcript export and import.
//!
//! A transcript is a pretty-printed UTF-8 JSON document:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "messages": [
//!     {
//!       "text": "Hello",
//!       "isUser": true,
//!       "timestamp": "2025-01-30T14:05:09.123Z",
//!       "attachments": []
//!     }
//!   ]
//! }
//! ```
//!
//! Attachments are never written; every exported message carries an empty
//! list.  Import accepts any non-empty `version` and always replaces the whole
//! conversation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::types::Message;
use crate::utils::time::file_stamp;

/// The schema version written by [`export`].
pub const TRANSCRIPT_VERSION: &str = "1.0";

/// A transcript document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFile {
    /// Schema identifier.
    pub version: String,

    /// The conversation, oldest first.
    pub messages: Vec<TranscriptMessage>,
}

/// One message as stored in a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    /// The displayed content.
    pub text: String,

    /// True if the human wrote it.
    pub is_user: bool,

    /// When the message entered the session.
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,

    /// Always written empty; ignored on read.
    #[serde(default)]
    pub attachments: Vec<Value>,
}

impl From<&Message> for TranscriptMessage {
    fn from(message: &Message) -> Self {
        Self {
            text: message.text.clone(),
            is_user: message.is_user,
            timestamp: message.timestamp,
            attachments: Vec::new(),
        }
    }
}

impl From<TranscriptMessage> for Message {
    fn from(message: TranscriptMessage) -> Self {
        Self {
            text: message.text,
            is_user: message.is_user,
            timestamp: message.timestamp,
            attachments: Vec::new(),
        }
    }
}

impl TranscriptFile {
    /// Render as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| {
            Error::export("failed to serialize transcript", Some(Box::new(err)))
        })
    }
}

/// Build a transcript from a conversation.  Attachments are dropped.
pub fn export(messages: &[Message]) -> TranscriptFile {
    TranscriptFile {
        version: TRANSCRIPT_VERSION.to_string(),
        messages: messages.iter().map(TranscriptMessage::from).collect(),
    }
}

/// Validate a transcript and return its messages.
///
/// Unparseable input is [`ImportErrorKind::MalformedJson`]; a missing or empty
/// `version`, a missing or non-array `messages`, or a message without string
/// `text`, boolean `isUser` and RFC 3339 `timestamp` is
/// [`ImportErrorKind::InvalidSchema`].
///
/// [`ImportErrorKind::MalformedJson`]: crate::ImportErrorKind::MalformedJson
/// [`ImportErrorKind::InvalidSchema`]: crate::ImportErrorKind::InvalidSchema
pub fn import(input: &[u8]) -> Result<Vec<Message>> {
    let document: Value = serde_json::from_slice(input)
        .map_err(|err| Error::malformed_json(format!("transcript is not valid JSON: {err}")))?;

    let Some(document) = document.as_object() else {
        return Err(Error::invalid_schema("transcript is not a JSON object"));
    };

    match document.get("version").and_then(Value::as_str) {
        Some(version) if !version.is_empty() => {}
        Some(_) => return Err(Error::invalid_schema("`version` is empty")),
        None => {
            return Err(Error::invalid_schema(
                "`version` is missing or not a string",
            ));
        }
    }

    let Some(messages) = document.get("messages").and_then(Value::as_array) else {
        return Err(Error::invalid_schema(
            "`messages` is missing or not an array",
        ));
    };

    messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            TranscriptMessage::deserialize(message)
                .map(Message::from)
                .map_err(|err| Error::invalid_schema(format!("message {index}: {err}")))
        })
        .collect()
}

/// The conventional file name for a transcript exported at `now`.
///
/// ```
/// # use time::macros::datetime;
/// let name = nexus::transcript::export_file_name(datetime!(2025-01-30 14:05:09.123 UTC));
/// assert_eq!(name, "chat-2025-01-30T14-05-09-123Z.json");
/// ```
pub fn export_file_name(now: OffsetDateTime) -> String {
    match file_stamp(&now) {
        Ok(stamp) => format!("chat-{stamp}.json"),
        Err(_) => format!("chat-{}.json", now.unix_timestamp()),
    }
}

/// Write a transcript of `messages` to `path`.
pub fn write_file<P: AsRef<Path>>(path: P, messages: &[Message]) -> Result<()> {
    let json = export(messages).to_json_pretty()?;
    std::fs::write(path.as_ref(), json)
        .map_err(|err| Error::export("failed to write transcript file", Some(Box::new(err))))
}

/// Read and validate the transcript at `path`.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<Message>> {
    let bytes = std::fs::read(path.as_ref())
        .map_err(|err| Error::io("failed to read transcript file", err))?;
    import(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImportErrorKind;
    use crate::types::Attachment;
    use serde_json::json;
    use time::macros::datetime;

    fn conversation() -> Vec<Message> {
        vec![
            Message::user(
                "Hello",
                vec![Attachment::from_text("notes.txt", "secret")],
                datetime!(2025-01-30 14:05:09.123 UTC),
            ),
            Message::assistant("Hi there", datetime!(2025-01-30 14:05:11.5 UTC)),
        ]
    }

    #[test]
    fn export_document() {
        let document = export(&conversation());
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "1.0",
                "messages": [
                    {
                        "text": "Hello",
                        "isUser": true,
                        "timestamp": "2025-01-30T14:05:09.123Z",
                        "attachments": []
                    },
                    {
                        "text": "Hi there",
                        "isUser": false,
                        "timestamp": "2025-01-30T14:05:11.5Z",
                        "attachments": []
                    }
                ]
            })
        );
    }

    #[test]
    fn export_is_pretty() {
        let json = export(&conversation()).to_json_pretty().unwrap();
        assert!(json.contains("\n  \"version\": \"1.0\""));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn round_trip_strips_attachments() {
        let messages = conversation();
        let json = export(&messages).to_json_pretty().unwrap();
        let imported = import(json.as_bytes()).unwrap();
        let expected: Vec<_> = messages.iter().map(Message::without_attachments).collect();
        assert_eq!(imported, expected);
    }

    #[test]
    fn round_trip_empty() {
        let json = export(&[]).to_json_pretty().unwrap();
        assert!(import(json.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn malformed_json() {
        let err = import(b"{\"version\": \"1.0\", ").unwrap_err();
        assert_eq!(err.import_kind(), Some(ImportErrorKind::MalformedJson));
        let err = import(&[0xff, 0xfe]).unwrap_err();
        assert_eq!(err.import_kind(), Some(ImportErrorKind::MalformedJson));
    }

    #[test]
    fn missing_messages() {
        let err = import(br#"{"version": "1.0"}"#).unwrap_err();
        assert_eq!(err.import_kind(), Some(ImportErrorKind::InvalidSchema));
    }

    #[test]
    fn messages_not_an_array() {
        let err = import(br#"{"version": "1.0", "messages": {}}"#).unwrap_err();
        assert_eq!(err.import_kind(), Some(ImportErrorKind::InvalidSchema));
    }

    #[test]
    fn missing_or_empty_version() {
        for doc in [
            r#"{"messages": []}"#,
            r#"{"version": "", "messages": []}"#,
            r#"{"version": 1, "messages": []}"#,
            r#"[]"#,
        ] {
            let err = import(doc.as_bytes()).unwrap_err();
            assert_eq!(
                err.import_kind(),
                Some(ImportErrorKind::InvalidSchema),
                "{doc}"
            );
        }
    }

    #[test]
    fn any_version_is_accepted() {
        let doc = r#"{"version": "2.7-beta", "messages": []}"#;
        assert!(import(doc.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn bad_message_is_invalid_schema() {
        let doc = r#"{"version": "1.0", "messages": [{"text": "Hi", "isUser": "yes", "timestamp": "2025-01-30T14:05:09Z"}]}"#;
        let err = import(doc.as_bytes()).unwrap_err();
        assert_eq!(err.import_kind(), Some(ImportErrorKind::InvalidSchema));

        let doc = r#"{"version": "1.0", "messages": [{"text": "Hi", "isUser": true, "timestamp": "noon"}]}"#;
        let err = import(doc.as_bytes()).unwrap_err();
        assert_eq!(err.import_kind(), Some(ImportErrorKind::InvalidSchema));
    }

    #[test]
    fn imported_attachments_are_ignored() {
        let doc = r#"{"version": "1.0", "messages": [{"text": "Hi", "isUser": true, "timestamp": "2025-01-30T14:05:09Z", "attachments": [{"name": "a.txt"}]}]}"#;
        let messages = import(doc.as_bytes()).unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].attachments.is_empty());
    }

    #[test]
    fn missing_attachments_field_is_fine() {
        let doc = r#"{"version": "1.0", "messages": [{"text": "Hi", "isUser": false, "timestamp": "2025-01-30T14:05:09Z"}]}"#;
        let messages = import(doc.as_bytes()).unwrap();
        assert!(messages[0].is_assistant());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name(datetime!(2025-01-30 14:05:09.123 UTC)));
        write_file(&path, &conversation()).unwrap();
        let imported = read_file(&path).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[1].text, "Hi there");
    }

    #[test]
    fn write_to_missing_directory_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("chat.json");
        let err = write_file(&path, &conversation()).unwrap_err();
        assert!(err.is_export());
    }
}
