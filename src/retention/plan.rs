//! Retention plan: the engine's output

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::BackupRecord;

/// Why a backup was selected for deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionReason {
    /// Older than the outdated horizon
    Outdated,
    /// Another backup already covers its age bucket
    Redundant,
    /// Evicted to respect the max-kept cap
    OverCapacity,
}

impl fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionReason::Outdated => write!(f, "outdated"),
            DeletionReason::Redundant => write!(f, "redundant"),
            DeletionReason::OverCapacity => write!(f, "over capacity"),
        }
    }
}

/// A backup selected for deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedDeletion {
    pub record: BackupRecord,
    pub reason: DeletionReason,
}

/// Diagnostic view of where a record landed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAssignment {
    pub record: BackupRecord,
    /// Age relative to the pass's `now`, in seconds
    pub age_secs: u64,
    /// Logarithmic bucket index
    pub bucket: u32,
    /// Deletion reason, or `None` if the record survives
    pub deletion: Option<DeletionReason>,
}

impl BucketAssignment {
    pub fn is_kept(&self) -> bool {
        self.deletion.is_none()
    }
}

/// Result of one retention pass
///
/// All lists are ordered oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPlan {
    /// The `now` the plan was computed against
    pub now: DateTime<Utc>,
    /// Records that survive the pass
    pub kept: Vec<BackupRecord>,
    /// Records to delete, with the rule that selected each
    pub deletions: Vec<PlannedDeletion>,
    /// Every input record with its bucket and fate
    pub assignments: Vec<BucketAssignment>,
}

impl RetentionPlan {
    /// An empty plan (no records at all)
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            now,
            kept: Vec::new(),
            deletions: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// Whether the plan deletes nothing
    pub fn is_noop(&self) -> bool {
        self.deletions.is_empty()
    }

    /// Identifiers of the records to delete
    pub fn deleted_identifiers(&self) -> Vec<&str> {
        self.deletions
            .iter()
            .map(|d| d.record.identifier.as_str())
            .collect()
    }

    /// Deletion reason for `identifier`, if it is to be deleted
    pub fn reason_for(&self, identifier: &str) -> Option<DeletionReason> {
        self.deletions
            .iter()
            .find(|d| d.record.identifier == identifier)
            .map(|d| d.reason)
    }

    /// The newest surviving record
    pub fn newest(&self) -> Option<&BackupRecord> {
        self.kept.last()
    }

    /// Number of deletions selected by `reason`
    pub fn count_by_reason(&self, reason: DeletionReason) -> usize {
        self.deletions.iter().filter(|d| d.reason == reason).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_plan() -> RetentionPlan {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let old = BackupRecord::new(now - chrono::Duration::days(5), "old.tar");
        let new = BackupRecord::new(now, "new.tar");
        RetentionPlan {
            now,
            kept: vec![new.clone()],
            deletions: vec![PlannedDeletion {
                record: old,
                reason: DeletionReason::Outdated,
            }],
            assignments: Vec::new(),
        }
    }

    #[test]
    fn test_plan_queries() {
        let plan = sample_plan();
        assert!(!plan.is_noop());
        assert_eq!(plan.deleted_identifiers(), vec!["old.tar"]);
        assert_eq!(plan.reason_for("old.tar"), Some(DeletionReason::Outdated));
        assert_eq!(plan.reason_for("new.tar"), None);
        assert_eq!(plan.newest().unwrap().identifier, "new.tar");
        assert_eq!(plan.count_by_reason(DeletionReason::Outdated), 1);
        assert_eq!(plan.count_by_reason(DeletionReason::Redundant), 0);
    }

    #[test]
    fn test_empty_plan() {
        let plan = RetentionPlan::empty(Utc::now());
        assert!(plan.is_noop());
        assert!(plan.newest().is_none());
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&DeletionReason::OverCapacity).unwrap();
        assert_eq!(json, "\"over_capacity\"");
    }
}
