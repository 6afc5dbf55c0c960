//! Backup record model
//!
//! A backup record pairs the moment a backup was taken with an opaque
//! identifier pointing back at the archive on disk.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single backup as seen by the retention engine
///
/// Records are ordered by timestamp, then by identifier, so that two
/// backups sharing a timestamp still have a deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackupRecord {
    /// When the backup was taken
    pub timestamp: DateTime<Utc>,
    /// Archive file name; never interpreted by the engine
    pub identifier: String,
}

impl BackupRecord {
    /// Create a new record
    pub fn new(timestamp: DateTime<Utc>, identifier: impl Into<String>) -> Self {
        Self {
            timestamp,
            identifier: identifier.into(),
        }
    }

    /// Age of the backup relative to `now`
    ///
    /// Timestamps in the future (clock skew) count as age zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.timestamp)
            .max(Duration::zero())
    }

    /// Age in whole seconds relative to `now`
    pub fn age_secs(&self, now: DateTime<Utc>) -> u64 {
        self.age(now).num_seconds().max(0) as u64
    }
}

impl Ord for BackupRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.identifier.cmp(&other.identifier))
    }
}

impl PartialOrd for BackupRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BackupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.identifier,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
