//! Generation request value object

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::content::ContentSource;
use crate::domain::error::{InvalidOptionError, RequestError};

use super::options::{GenderPreference, HostKind, LengthKind, StyleKind};

/// Script generation options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleKind>,
}

/// Text-to-speech voice options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_preference: Option<GenderPreference>,
    /// Speaker names for multi-talker voices, sent comma separated (e.g. "ava,steffan")
    #[serde(
        rename = "multiTalkerVoiceSpeakerNames",
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_speaker_names",
        deserialize_with = "deserialize_speaker_names"
    )]
    pub multi_talker_speaker_names: Vec<String>,
}

/// Split a comma separated speaker list, dropping blanks
pub fn parse_speaker_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn serialize_speaker_names<S: Serializer>(names: &[String], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&names.join(","))
}

fn deserialize_speaker_names<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().map(parse_speaker_names).unwrap_or_default())
}

/// Validate a BCP-47 style locale tag such as `en-US` or `zh-Hans-CN`.
///
/// Only the shape is checked; the service decides which locales it supports.
pub fn validate_locale(input: &str) -> Result<String, InvalidOptionError> {
    let locale = input.trim();
    let invalid = || InvalidOptionError {
        kind: "locale",
        input: input.to_string(),
        valid: "a BCP-47 tag such as en-US",
    };

    let mut subtags = locale.split('-');
    let language = subtags.next().unwrap_or_default();
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }
    for subtag in subtags {
        if subtag.is_empty() || subtag.len() > 8 || !subtag.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(invalid());
        }
    }

    Ok(locale.to_string())
}

/// A request to generate one podcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub display_name: String,
    pub description: String,
    pub locale: String,
    pub host: Option<HostKind>,
    pub script: ScriptOptions,
    pub voice: VoiceOptions,
    pub content: ContentSource,
}

const DEFAULT_DISPLAY_NAME: &str = "Generation Name";
const DEFAULT_DESCRIPTION: &str = "Generation Description";

impl GenerationRequest {
    /// Create a request with default naming and no optional settings
    pub fn new(locale: impl Into<String>, content: ContentSource) -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            locale: locale.into(),
            host: None,
            script: ScriptOptions::default(),
            voice: VoiceOptions::default(),
            content,
        }
    }
}

/// Everything needed for a request except its content.
///
/// Callers collect a draft from user input, validate it, resolve content,
/// then combine the two with [`GenerationDraft::into_request`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationDraft {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub locale: Option<String>,
    pub host: Option<HostKind>,
    pub script: ScriptOptions,
    pub voice: VoiceOptions,
}

impl GenerationDraft {
    /// Check required fields without touching content. Returns the normalized locale.
    pub fn validate(&self) -> Result<String, RequestError> {
        let locale = self
            .locale
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .ok_or(RequestError::MissingLocale)?;
        Ok(validate_locale(locale)?)
    }

    /// Combine with resolved content
    pub fn into_request(self, content: ContentSource) -> Result<GenerationRequest, RequestError> {
        let locale = self.validate()?;
        Ok(GenerationRequest {
            display_name: self
                .display_name
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            locale,
            host: self.host,
            script: self.script,
            voice: self.voice,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_names_split_and_trim() {
        assert_eq!(parse_speaker_names("ava, steffan,,"), vec!["ava", "steffan"]);
        assert!(parse_speaker_names("").is_empty());
    }

    #[test]
    fn voice_options_wire_shape() {
        let voice = VoiceOptions {
            voice_name: None,
            gender_preference: Some(GenderPreference::Female),
            multi_talker_speaker_names: vec!["ava".to_string(), "andrew".to_string()],
        };
        let json = serde_json::to_value(&voice).unwrap();
        assert_eq!(json["genderPreference"], "Female");
        assert_eq!(json["multiTalkerVoiceSpeakerNames"], "ava,andrew");
        assert!(json.get("voiceName").is_none());

        let back: VoiceOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, voice);
    }

    #[test]
    fn empty_script_options_serialize_to_empty_object() {
        let json = serde_json::to_string(&ScriptOptions::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn locale_validation() {
        assert_eq!(validate_locale(" en-US ").unwrap(), "en-US");
        assert!(validate_locale("zh-Hans-CN").is_ok());
        assert!(validate_locale("").is_err());
        assert!(validate_locale("english").is_err());
        assert!(validate_locale("en_US").is_err());
        assert!(validate_locale("en-").is_err());
    }

    #[test]
    fn draft_requires_locale() {
        let draft = GenerationDraft::default();
        assert!(matches!(draft.validate(), Err(RequestError::MissingLocale)));

        let draft = GenerationDraft {
            locale: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(draft.validate(), Err(RequestError::MissingLocale)));

        let draft = GenerationDraft {
            locale: Some("en_US".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            draft.validate(),
            Err(RequestError::InvalidOption(_))
        ));
    }

    #[test]
    fn draft_into_request_fills_defaults() {
        let draft = GenerationDraft {
            locale: Some("en-US".to_string()),
            host: Some(HostKind::OneHost),
            ..Default::default()
        };
        let request = draft
            .into_request(ContentSource::TempFileRef("tmp-1".to_string()))
            .unwrap();
        assert_eq!(request.locale, "en-US");
        assert_eq!(request.display_name, "Generation Name");
        assert_eq!(request.host, Some(HostKind::OneHost));
        assert_eq!(request.content, ContentSource::TempFileRef("tmp-1".to_string()));
    }
}
