//! Content source resolution
//!
//! Turns user-supplied hints into exactly one [`ContentSource`], enforcing
//! the inline size limits before anything is sent anywhere.

use std::path::Path;

use crate::domain::content::{
    Base64Content, ContentFileFormat, ContentHints, ContentSource, TextContent,
    MAX_PLAIN_TEXT_LENGTH,
};
use crate::domain::error::ContentError;

/// Resolve content hints.
///
/// Precedence: remote URL, then temp file id, then local file, then local
/// file marked for base64 encoding. Blank hints are ignored.
pub async fn resolve_content(hints: &ContentHints) -> Result<ContentSource, ContentError> {
    if let Some(url) = non_blank(hints.remote_url.as_deref()) {
        return Ok(ContentSource::RemoteUrl(url.to_string()));
    }
    if let Some(id) = non_blank(hints.temp_file_id.as_deref()) {
        return Ok(ContentSource::TempFileRef(id.to_string()));
    }
    if let Some(path) = &hints.file_path {
        return resolve_local_file(path).await;
    }
    if let Some(path) = &hints.base64_file_path {
        let format = format_of(path)?;
        return read_base64(path, format).await.map(ContentSource::InlineBase64);
    }
    Err(ContentError::MissingSource)
}

async fn resolve_local_file(path: &Path) -> Result<ContentSource, ContentError> {
    match format_of(path)? {
        ContentFileFormat::Txt => read_text(path).await.map(ContentSource::InlineText),
        ContentFileFormat::Pdf => read_base64(path, ContentFileFormat::Pdf)
            .await
            .map(ContentSource::InlineBase64),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn format_of(path: &Path) -> Result<ContentFileFormat, ContentError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    ContentFileFormat::from_extension(ext).ok_or_else(|| ContentError::UnsupportedFormat {
        extension: if ext.is_empty() {
            "(none)".to_string()
        } else {
            format!(".{}", ext)
        },
    })
}

fn read_failed(path: &Path) -> impl FnOnce(std::io::Error) -> ContentError + '_ {
    move |e| ContentError::ReadFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

async fn file_len(path: &Path) -> Result<u64, ContentError> {
    let metadata = tokio::fs::metadata(path).await.map_err(read_failed(path))?;
    Ok(metadata.len())
}

async fn read_text(path: &Path) -> Result<TextContent, ContentError> {
    // Size is known from metadata; oversized files are never read
    let len = file_len(path).await?;
    if len > MAX_PLAIN_TEXT_LENGTH {
        return Err(ContentError::SizeLimitExceeded {
            subject: "Text file",
            actual: len,
            limit: MAX_PLAIN_TEXT_LENGTH,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(read_failed(path))?;
    let text = String::from_utf8(bytes).map_err(|_| ContentError::InvalidText(path.to_path_buf()))?;
    TextContent::new(text)
}

async fn read_base64(path: &Path, format: ContentFileFormat) -> Result<Base64Content, ContentError> {
    Base64Content::check_limits(file_len(path).await?)?;
    let bytes = tokio::fs::read(path).await.map_err(read_failed(path))?;
    Base64Content::encode(&bytes, format)
}
