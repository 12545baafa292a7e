//! Remote resource shapes reported by the service

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidOptionError;

use super::options::HostKind;
use super::request::{ScriptOptions, VoiceOptions};

/// Status of a long-running operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationStatus {
    #[default]
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl OperationStatus {
    /// Terminal statuses never change again
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for OperationStatus {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "notstarted" => Ok(Self::NotStarted),
            "running" => Ok(Self::Running),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(InvalidOptionError {
                kind: "operation status",
                input: s.to_string(),
                valid: "NotStarted, Running, Succeeded, Failed, Cancelled",
            }),
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status document returned by the operation-location endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    #[serde(default)]
    pub id: Option<String>,
    pub status: OperationStatus,
}

/// Output of a succeeded generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_file_url: Option<String>,
}

/// A podcast generation as the service reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResource {
    pub id: String,
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostKind>,
    /// Content echo; kept untyped since it may carry large inline payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_generation: Option<ScriptOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts: Option<VoiceOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<GenerationOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action_date_time: Option<DateTime<Utc>>,
}

impl GenerationResource {
    /// URL of the generated audio, if the service produced one
    pub fn audio_url(&self) -> Option<&str> {
        self.output.as_ref()?.audio_file_url.as_deref()
    }
}

/// One page of a paged list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// No `nextLink` means this is the last page
    pub fn is_last(&self) -> bool {
        self.next_link.is_none()
    }
}

/// Optional paging arguments for list calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub max_page_size: Option<u32>,
}
