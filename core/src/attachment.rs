//! Email attachments.
//!
//! `AttachmentFile` is the caller-facing binary input; `Attachment` is the
//! base64 record that goes over the wire. Conversion happens right before a
//! send-email request is built and preserves order.

use std::path::Path;

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Raw file contents to attach to an outgoing email.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AttachmentFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The content type is guessed from the
    /// extension, falling back to `application/octet-stream`.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ApiError::AttachmentError {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    pub fn to_attachment(&self) -> Attachment {
        Attachment {
            filename: self.filename.clone(),
            content: BASE64_STANDARD.encode(&self.bytes),
            content_type: self.content_type.clone(),
        }
    }
}

impl std::fmt::Debug for AttachmentFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Wire form of an attachment: base64 content plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub content: String,
    pub content_type: String,
}

pub(crate) fn encode_all(files: &[AttachmentFile]) -> Option<Vec<Attachment>> {
    if files.is_empty() {
        None
    } else {
        Some(files.iter().map(AttachmentFile::to_attachment).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_attachment_encodes_bytes_as_standard_base64() {
        let file = AttachmentFile::new("report.bin", "application/octet-stream", vec![0u8, 0xff, 0x10]);
        let attachment = file.to_attachment();
        assert_eq!(attachment.filename, "report.bin");
        assert_eq!(attachment.content_type, "application/octet-stream");
        assert_eq!(attachment.content, "AP8Q");
        assert_eq!(BASE64_STANDARD.decode(&attachment.content).unwrap(), file.bytes);
    }

    #[test]
    fn attachment_serializes_content_type_in_camel_case() {
        let attachment = AttachmentFile::new("a.txt", "text/plain", b"hi".to_vec()).to_attachment();
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["contentType"], "text/plain");
        assert_eq!(json["content"], "aGk=");
    }

    #[test]
    fn encode_all_keeps_order_and_skips_empty() {
        assert!(encode_all(&[]).is_none());
        let files = vec![
            AttachmentFile::new("1.txt", "text/plain", b"one".to_vec()),
            AttachmentFile::new("2.png", "image/png", b"two".to_vec()),
            AttachmentFile::new("3.pdf", "application/pdf", b"three".to_vec()),
        ];
        let encoded = encode_all(&files).unwrap();
        let names: Vec<&str> = encoded.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["1.txt", "2.png", "3.pdf"]);
        assert_eq!(encoded[1].content_type, "image/png");
    }

    #[test]
    fn debug_hides_file_contents() {
        let file = AttachmentFile::new("a.txt", "text/plain", b"secret".to_vec());
        let debug = format!("{file:?}");
        assert!(debug.contains("len: 6"));
        assert!(!debug.contains("115"));
    }
}
