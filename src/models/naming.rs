//! Archive naming convention
//!
//! Backups are named `{prefix}_{YYYY-MM-DD_HH-MM-SS}.tar` or `.tar.gz`,
//! with the timestamp in UTC.
//! The timestamp embedded in the name is the only durable record of when
//! a backup was taken, so parsing it back is an explicit, fallible step.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BackupError, BackupResult};

use super::record::BackupRecord;

/// strftime format of the timestamp embedded in archive names
///
/// Always UTC. Archives named in local time by other tools parse fine but
/// are read as shifted by the local UTC offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Archive container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Plain tar archive
    #[default]
    Tar,
    /// Gzip-compressed tar archive
    TarGz,
}

impl ArchiveFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }

    /// Pick the format from the `compress` flag
    pub fn from_compress(compress: bool) -> Self {
        if compress {
            ArchiveFormat::TarGz
        } else {
            ArchiveFormat::Tar
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Formats and parses backup file names for one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupNaming {
    prefix: String,
    format: ArchiveFormat,
}

impl BackupNaming {
    /// Create a naming convention for `prefix`, producing archives of `format`
    pub fn new(prefix: impl Into<String>, format: ArchiveFormat) -> Self {
        Self {
            prefix: prefix.into(),
            format,
        }
    }

    /// The configured prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The format new archives are written in
    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// File name for a backup taken at `timestamp`
    pub fn file_name(&self, timestamp: DateTime<Utc>) -> String {
        format!(
            "{}_{}.{}",
            self.prefix,
            timestamp.format(TIMESTAMP_FORMAT),
            self.format.extension()
        )
    }

    /// Name of the lock file guarding the backup directory
    pub fn lock_file_name(&self) -> String {
        format!(".{}.lock", self.prefix)
    }

    /// Name of the run journal kept in the backup directory
    pub fn journal_file_name(&self) -> String {
        format!("{}.journal.jsonl", self.prefix)
    }

    /// Whether `name` looks like one of our archives
    ///
    /// Archives of either format are recognized, so switching compression
    /// on or off does not orphan older backups.
    pub fn matches(&self, name: &str) -> bool {
        self.strip_affixes(name).is_some()
    }

    /// Parse a file name into a backup record
    ///
    /// Fails if the name does not carry our prefix and a known archive
    /// extension, or if the embedded timestamp is malformed.
    pub fn parse(&self, name: &str) -> BackupResult<BackupRecord> {
        let date_part = self.strip_affixes(name).ok_or_else(|| {
            BackupError::invalid_name(
                name,
                format!("expected {}_<timestamp>.tar[.gz]", self.prefix),
            )
        })?;

        let naive = NaiveDateTime::parse_from_str(date_part, TIMESTAMP_FORMAT).map_err(|e| {
            BackupError::invalid_name(name, format!("bad timestamp '{}': {}", date_part, e))
        })?;

        Ok(BackupRecord::new(
            DateTime::from_naive_utc_and_offset(naive, Utc),
            name,
        ))
    }

    // The timestamp must start right after `{prefix}_`, so `backup_db_...`
    // belongs to prefix `backup_db` and is not ours.
    fn strip_affixes<'a>(&self, name: &'a str) -> Option<&'a str> {
        let rest = name.strip_prefix(self.prefix.as_str())?.strip_prefix('_')?;
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        [ArchiveFormat::TarGz, ArchiveFormat::Tar]
            .iter()
            .find_map(|format| {
                rest.strip_suffix(format.extension())
                    .and_then(|r| r.strip_suffix('.'))
            })
    }
}
