//! Content source value objects

use std::fmt;
use std::path::PathBuf;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::domain::error::ContentError;

/// Maximum length of inline plain text content (1 MiB)
pub const MAX_PLAIN_TEXT_LENGTH: u64 = 1024 * 1024;

/// Maximum length of base64-encoded inline content (8 MiB)
pub const MAX_BASE64_TEXT_LENGTH: u64 = 8 * 1024 * 1024;

/// Maximum size of a raw content file (50 MiB)
pub const MAX_CONTENT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Length of the base64 (padded) encoding of `raw_len` bytes
pub const fn base64_encoded_len(raw_len: u64) -> u64 {
    raw_len.div_ceil(3) * 4
}

/// Format of a content file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentFileFormat {
    Txt,
    Pdf,
}

impl ContentFileFormat {
    /// Map a file extension (with or without leading dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Get the string representation used on the wire
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "Txt",
            Self::Pdf => "Pdf",
        }
    }
}

impl fmt::Display for ContentFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inline plain text, guaranteed to fit the inline text limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    text: String,
}

impl TextContent {
    /// Wrap text, rejecting anything over [`MAX_PLAIN_TEXT_LENGTH`] bytes
    pub fn new(text: impl Into<String>) -> Result<Self, ContentError> {
        let text = text.into();
        let actual = text.len() as u64;
        if actual > MAX_PLAIN_TEXT_LENGTH {
            return Err(ContentError::SizeLimitExceeded {
                subject: "Text content",
                actual,
                limit: MAX_PLAIN_TEXT_LENGTH,
            });
        }
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Inline text is always sent as `Txt`
    pub const fn format(&self) -> ContentFileFormat {
        ContentFileFormat::Txt
    }
}

/// Base64-encoded file content, guaranteed to fit both the raw and encoded limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Content {
    data: String,
    format: ContentFileFormat,
    raw_len: u64,
}

impl Base64Content {
    /// Encode raw bytes.
    ///
    /// Limits are checked on the byte count before encoding so oversized
    /// input never gets allocated twice.
    pub fn encode(bytes: &[u8], format: ContentFileFormat) -> Result<Self, ContentError> {
        let raw_len = bytes.len() as u64;
        Self::check_limits(raw_len)?;

        Ok(Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            format,
            raw_len,
        })
    }

    /// Check whether `raw_len` bytes may be sent inline as base64
    pub fn check_limits(raw_len: u64) -> Result<(), ContentError> {
        if raw_len > MAX_CONTENT_FILE_SIZE {
            return Err(ContentError::SizeLimitExceeded {
                subject: "Content file",
                actual: raw_len,
                limit: MAX_CONTENT_FILE_SIZE,
            });
        }

        let encoded = base64_encoded_len(raw_len);
        if encoded > MAX_BASE64_TEXT_LENGTH {
            return Err(ContentError::SizeLimitExceeded {
                subject: "Base64-encoded content",
                actual: encoded,
                limit: MAX_BASE64_TEXT_LENGTH,
            });
        }
        Ok(())
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn format(&self) -> ContentFileFormat {
        self.format
    }

    /// Size of the original bytes
    pub fn raw_len(&self) -> u64 {
        self.raw_len
    }

    /// Decode the payload back to the original bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data)
    }
}

/// Where the podcast content comes from. Exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Publicly reachable blob URL
    RemoteUrl(String),
    /// Plain text embedded in the request
    InlineText(TextContent),
    /// File bytes embedded in the request as base64
    InlineBase64(Base64Content),
    /// File previously uploaded to temp storage
    TempFileRef(String),
}

impl ContentSource {
    /// Short label used in logs and status output
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RemoteUrl(_) => "remote-url",
            Self::InlineText(_) => "inline-text",
            Self::InlineBase64(_) => "inline-base64",
            Self::TempFileRef(_) => "temp-file",
        }
    }
}

/// User-supplied hints for locating content.
///
/// Several may be set; resolution picks one by precedence:
/// remote URL, then temp file id, then local text path, then local base64 path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentHints {
    pub remote_url: Option<String>,
    pub temp_file_id: Option<String>,
    pub file_path: Option<PathBuf>,
    pub base64_file_path: Option<PathBuf>,
}

impl ContentHints {
    pub fn is_empty(&self) -> bool {
        self.remote_url.is_none()
            && self.temp_file_id.is_none()
            && self.file_path.is_none()
            && self.base64_file_path.is_none()
    }
}
