//! Duration parsing for configuration values
//!
//! Durations are written as an integer with an optional unit suffix:
//! `s`, `m`, `h`, `d` or `w`. A bare integer counts seconds.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{BackupError, BackupResult};

const UNITS: [(&str, i64); 5] = [
    ("w", 7 * 86_400),
    ("d", 86_400),
    ("h", 3_600),
    ("m", 60),
    ("s", 1),
];

// chrono rejects anything past i64::MAX milliseconds.
const MAX_SECS: i64 = i64::MAX / 1_000;

/// Parse a duration such as `90`, `45m`, `12h`, `1d` or `2w`
pub fn parse_duration(input: &str) -> BackupResult<Duration> {
    let text = input.trim();
    if text.is_empty() {
        return Err(BackupError::Config("empty duration".into()));
    }

    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);

    if digits.is_empty() {
        return Err(BackupError::Config(format!(
            "invalid duration '{}': expected a number with optional unit s/m/h/d/w",
            input
        )));
    }

    let value: i64 = digits
        .parse()
        .map_err(|e| BackupError::Config(format!("invalid duration '{}': {}", input, e)))?;

    let multiplier = if unit.is_empty() {
        1
    } else {
        UNITS
            .iter()
            .find(|(suffix, _)| unit.eq_ignore_ascii_case(suffix))
            .map(|(_, secs)| *secs)
            .ok_or_else(|| {
                BackupError::Config(format!(
                    "invalid duration unit '{}' in '{}' (use s, m, h, d or w)",
                    unit, input
                ))
            })?
    };

    let secs = value
        .checked_mul(multiplier)
        .filter(|s| *s <= MAX_SECS)
        .ok_or_else(|| BackupError::Config(format!("duration '{}' is too large", input)))?;

    Ok(Duration::seconds(secs))
}

/// Render a duration in the largest unit that represents it exactly
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();
    if secs == 0 {
        return "0s".to_string();
    }
    UNITS
        .iter()
        .find(|(_, unit)| secs % unit == 0)
        .map(|(suffix, unit)| format!("{}{}", secs / unit, suffix))
        .unwrap_or_else(|| format!("{}s", secs))
}

/// A duration as it appears in config files
///
/// Deserializes from either an integer number of seconds or a string with a
/// unit suffix, and serializes back to the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDuration", into = "String")]
pub struct ConfigDuration(Duration);

impl ConfigDuration {
    pub fn seconds(secs: i64) -> Self {
        Self(Duration::seconds(secs))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for ConfigDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl FromStr for ConfigDuration {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

impl fmt::Display for ConfigDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_duration(self.0))
    }
}

impl From<ConfigDuration> for String {
    fn from(value: ConfigDuration) -> Self {
        value.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(i64),
    Text(String),
}

impl TryFrom<RawDuration> for ConfigDuration {
    type Error = BackupError;

    fn try_from(raw: RawDuration) -> Result<Self, Self::Error> {
        match raw {
            RawDuration::Seconds(secs) if (0..=MAX_SECS).contains(&secs) => {
                Ok(Self::seconds(secs))
            }
            RawDuration::Seconds(secs) => Err(BackupError::Config(format!(
                "duration out of range: {}",
                secs
            ))),
            RawDuration::Text(text) => text.parse(),
        }
    }
}
