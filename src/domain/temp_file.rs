//! Temporary file resources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidOptionError;

/// Longest lease the service grants a temp file (24 hours)
pub const MAX_TEMP_FILE_EXPIRY_MINS: u32 = 24 * 60;

/// A file held server-side under a time-limited lease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempFile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<u64>,
}

/// Check a requested lease length
pub fn validate_expiry_mins(mins: u32) -> Result<u32, InvalidOptionError> {
    if (1..=MAX_TEMP_FILE_EXPIRY_MINS).contains(&mins) {
        Ok(mins)
    } else {
        Err(InvalidOptionError {
            kind: "expiry in minutes",
            input: mins.to_string(),
            valid: "1 to 1440",
        })
    }
}
