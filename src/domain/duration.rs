//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default wait between two status polls (5 seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default granularity of cancellation checks while waiting (1 second)
pub const DEFAULT_CANCEL_CHECK_SECS: u64 = 1;

/// Default retention of finished jobs (24 hours)
pub const DEFAULT_JOB_RETENTION_SECS: u64 = 24 * 60 * 60;

/// Value object representing a time span configured by the user.
/// Immutable, never zero, and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default poll interval (5 seconds)
    pub const fn default_poll_interval() -> Self {
        Self::from_secs(DEFAULT_POLL_INTERVAL_SECS)
    }

    /// Default cancellation check granularity (1 second)
    pub const fn default_cancel_check() -> Self {
        Self::from_secs(DEFAULT_CANCEL_CHECK_SECS)
    }

    /// Default retention for finished jobs (24 hours)
    pub const fn default_job_retention() -> Self {
        Self::from_secs(DEFAULT_JOB_RETENTION_SECS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse a duration string into a Duration value object.
    /// Supported formats: "30s", "1m", "2m30s", "24h", "1h30m"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let mut total_secs: u64 = 0;
        let mut current_num = String::new();
        let mut found_any = false;

        for ch in input.chars() {
            if ch.is_ascii_digit() {
                current_num.push(ch);
                continue;
            }

            let unit = match ch {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => return Err(invalid()),
            };
            if current_num.is_empty() {
                return Err(invalid());
            }

            let value: u64 = current_num.parse().map_err(|_| invalid())?;
            total_secs = value
                .checked_mul(unit)
                .and_then(|v| total_secs.checked_add(v))
                .ok_or_else(invalid)?;
            current_num.clear();
            found_any = true;
        }

        // Leftover digits without a unit are ambiguous
        if !current_num.is_empty() || !found_any || total_secs == 0 {
            return Err(invalid());
        }

        let milliseconds = total_secs.checked_mul(1000).ok_or_else(invalid)?;
        Ok(Self { milliseconds })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.as_secs();
        if total_secs == 0 {
            return write!(f, "{}ms", self.milliseconds);
        }

        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if minutes > 0 {
            write!(f, "{}m", minutes)?;
        }
        if seconds > 0 {
            write!(f, "{}s", seconds)?;
        }
        Ok(())
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_poll_interval()
    }
}
