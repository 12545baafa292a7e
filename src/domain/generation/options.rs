//! Podcast option value objects

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidOptionError;

/// Number of podcast hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostKind {
    OneHost,
    TwoHosts,
}

impl HostKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneHost => "OneHost",
            Self::TwoHosts => "TwoHosts",
        }
    }
}

impl FromStr for HostKind {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "onehost" | "one-host" | "one" => Ok(Self::OneHost),
            "twohosts" | "two-hosts" | "two" => Ok(Self::TwoHosts),
            _ => Err(InvalidOptionError {
                kind: "host",
                input: s.to_string(),
                valid: "OneHost, TwoHosts",
            }),
        }
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target podcast length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthKind {
    VeryShort,
    Short,
    Medium,
    Long,
    VeryLong,
}

impl LengthKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VeryShort => "VeryShort",
            Self::Short => "Short",
            Self::Medium => "Medium",
            Self::Long => "Long",
            Self::VeryLong => "VeryLong",
        }
    }
}

impl FromStr for LengthKind {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "veryshort" => Ok(Self::VeryShort),
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            "verylong" => Ok(Self::VeryLong),
            _ => Err(InvalidOptionError {
                kind: "length",
                input: s.to_string(),
                valid: "VeryShort, Short, Medium, Long, VeryLong",
            }),
        }
    }
}

impl fmt::Display for LengthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Script style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleKind {
    Default,
    Professional,
    Casual,
}

impl StyleKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Professional => "Professional",
            Self::Casual => "Casual",
        }
    }
}

impl FromStr for StyleKind {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "professional" => Ok(Self::Professional),
            "casual" => Ok(Self::Casual),
            _ => Err(InvalidOptionError {
                kind: "style",
                input: s.to_string(),
                valid: "Default, Professional, Casual",
            }),
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Preferred voice gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenderPreference {
    Female,
    Male,
}

impl GenderPreference {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

impl FromStr for GenderPreference {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            _ => Err(InvalidOptionError {
                kind: "gender preference",
                input: s.to_string(),
                valid: "Female, Male",
            }),
        }
    }
}

impl fmt::Display for GenderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
