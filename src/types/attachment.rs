use utf8path::Path;

use crate::error::{Error, Result};

/// Where an attachment's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// A file on disk, read when the prompt is composed.
    File(String),

    /// Text already held in memory.
    Text(String),
}

/// A user-supplied document whose text is inlined into the outbound prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    source: AttachmentSource,
}

impl Attachment {
    /// Attach the file at `path`.  The display name is the final path component.
    ///
    /// Nothing is read until the prompt is composed, so a missing file is not
    /// an error here.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = Path::from(path.as_str()).basename().as_str().to_string();
        let name = if name.is_empty() { path.clone() } else { name };
        Self {
            name,
            source: AttachmentSource::File(path),
        }
    }

    /// Attach in-memory text under a display name.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: AttachmentSource::Text(text.into()),
        }
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The content source.
    pub fn source(&self) -> &AttachmentSource {
        &self.source
    }

    /// Read the attachment as UTF-8 text.
    ///
    /// A missing or unreadable file, or one that is not valid UTF-8, yields
    /// [`Error::AttachmentRead`].
    pub async fn read_text(&self) -> Result<String> {
        match &self.source {
            AttachmentSource::Text(text) => Ok(text.clone()),
            AttachmentSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|err| Error::attachment_read(&self.name, err.to_string()))?;
                String::from_utf8(bytes).map_err(|err| {
                    Error::attachment_read(&self.name, format!("not UTF-8 text: {err}"))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn name_is_basename() {
        let attachment = Attachment::from_path("/tmp/docs/notes.txt");
        assert_eq!(attachment.name(), "notes.txt");
        assert_eq!(
            attachment.source(),
            &AttachmentSource::File("/tmp/docs/notes.txt".to_string())
        );
    }

    #[tokio::test]
    async fn read_inline_text() {
        let attachment = Attachment::from_text("inline.md", "# Title");
        assert_eq!(attachment.read_text().await.unwrap(), "# Title");
    }

    #[tokio::test]
    async fn read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "line one\nline two").unwrap();
        let attachment = Attachment::from_path(file.path().to_str().unwrap());
        assert_eq!(attachment.read_text().await.unwrap(), "line one\nline two");
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let attachment = Attachment::from_path(path.to_str().unwrap());
        let err = attachment.read_text().await.unwrap_err();
        assert!(err.is_attachment_read());
    }

    #[tokio::test]
    async fn binary_file_is_a_read_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x9f]).unwrap();
        let attachment = Attachment::from_path(file.path().to_str().unwrap());
        let err = attachment.read_text().await.unwrap_err();
        assert!(err.is_attachment_read());
    }
}
