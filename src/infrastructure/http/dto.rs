//! Wire request bodies

use serde::Serialize;

use crate::domain::content::{ContentFileFormat, ContentSource};
use crate::domain::generation::{GenerationRequest, HostKind, ScriptOptions, VoiceOptions};

/// Content block of a create request; exactly one source field is set
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_file_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<ContentFileFormat>,
}

impl<'a> From<&'a ContentSource> for ContentBody<'a> {
    fn from(source: &'a ContentSource) -> Self {
        match source {
            ContentSource::RemoteUrl(url) => Self {
                url: Some(url),
                ..Default::default()
            },
            ContentSource::InlineText(text) => Self {
                text: Some(text.as_str()),
                file_format: Some(text.format()),
                ..Default::default()
            },
            ContentSource::InlineBase64(content) => Self {
                base64_text: Some(content.data()),
                file_format: Some(content.format()),
                ..Default::default()
            },
            ContentSource::TempFileRef(id) => Self {
                temp_file_id: Some(id),
                ..Default::default()
            },
        }
    }
}

/// Body of a create-generation request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationBody<'a> {
    pub display_name: &'a str,
    pub description: &'a str,
    pub locale: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<HostKind>,
    pub content: ContentBody<'a>,
    pub script_generation: &'a ScriptOptions,
    pub tts: &'a VoiceOptions,
}

impl<'a> From<&'a GenerationRequest> for GenerationBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            display_name: &request.display_name,
            description: &request.description,
            locale: &request.locale,
            host: request.host,
            content: ContentBody::from(&request.content),
            script_generation: &request.script,
            tts: &request.voice,
        }
    }
}
