//! Content source domain

mod source;

pub use source::{
    base64_encoded_len, Base64Content, ContentFileFormat, ContentHints, ContentSource,
    TextContent, MAX_BASE64_TEXT_LENGTH, MAX_CONTENT_FILE_SIZE, MAX_PLAIN_TEXT_LENGTH,
};
