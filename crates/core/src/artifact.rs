//! Uploaded artifacts — lab reports and scans attached to a single turn.
//!
//! An artifact is valid only for the turn it was attached to; it is never
//! retained in the session log. Decoding is synchronous and in-memory,
//! bounded by the artifact's own size.

use serde::{Deserialize, Serialize};

use crate::error::AttachmentError;

/// A reference to one uploaded file, as handed over by the UI shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Original file name (for diagnostics only; format is sniffed from bytes)
    pub file_name: String,

    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Validate and decode the artifact for transport.
    ///
    /// The format is sniffed from the file header, never trusted from the
    /// file name. Unsupported or unreadable content is a recoverable error —
    /// the caller drops the attachment and proceeds text-only.
    pub fn decode(&self) -> Result<DecodedArtifact, AttachmentError> {
        if self.bytes.is_empty() {
            return Err(AttachmentError::Unreadable(format!(
                "{} is empty",
                self.file_name
            )));
        }

        let kind = ArtifactKind::sniff(&self.bytes).ok_or_else(|| {
            AttachmentError::UnsupportedFormat(self.file_name.clone())
        })?;

        Ok(DecodedArtifact {
            kind,
            data: self.bytes.clone(),
        })
    }
}

/// Supported artifact formats (the uploader's allowlist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Png,
    Jpeg,
    Pdf,
}

impl ArtifactKind {
    /// Identify the format from the file header.
    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ArtifactKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ArtifactKind::Jpeg)
        } else if bytes.starts_with(b"%PDF-") {
            Some(ArtifactKind::Pdf)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::Png => "image/png",
            ArtifactKind::Jpeg => "image/jpeg",
            ArtifactKind::Pdf => "application/pdf",
        }
    }
}

/// A decoded artifact ready for the wire: a recognized format plus its bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedArtifact {
    pub kind: ArtifactKind,
    pub data: Vec<u8>,
}

impl DecodedArtifact {
    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}
