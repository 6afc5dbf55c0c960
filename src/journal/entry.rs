//! Journal entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backup::{CycleReport, DeletionStatus};
use crate::models::BackupRecord;
use crate::retention::DeletionReason;

/// Kinds of events recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalEvent {
    /// A new archive was written
    Created,
    /// A backup was removed by retention
    Deleted,
    /// Retention selected a backup but removing it failed
    DeleteFailed,
    /// A file matched the backup pattern but could not be parsed
    Rejected,
}

impl std::fmt::Display for JournalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalEvent::Created => write!(f, "CREATED"),
            JournalEvent::Deleted => write!(f, "DELETED"),
            JournalEvent::DeleteFailed => write!(f, "DELETE FAILED"),
            JournalEvent::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// A single journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// When the run that produced this entry started (UTC)
    pub timestamp: DateTime<Utc>,

    pub event: JournalEvent,

    /// Archive file name
    pub identifier: String,

    /// Deletion reason, error message, or rejection reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl JournalEntry {
    /// Entry for a newly created archive
    pub fn created(record: &BackupRecord, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            event: JournalEvent::Created,
            identifier: record.identifier.clone(),
            detail: None,
        }
    }

    /// Entry for a backup removed by retention
    pub fn deleted(identifier: impl Into<String>, reason: DeletionReason, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            event: JournalEvent::Deleted,
            identifier: identifier.into(),
            detail: Some(reason.to_string()),
        }
    }

    /// Entry for a deletion that failed
    pub fn delete_failed(
        identifier: impl Into<String>,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: now,
            event: JournalEvent::DeleteFailed,
            identifier: identifier.into(),
            detail: Some(error.into()),
        }
    }

    /// Entry for a file whose name could not be parsed
    pub fn rejected(name: impl Into<String>, reason: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            event: JournalEvent::Rejected,
            identifier: name.into(),
            detail: Some(reason.into()),
        }
    }

    /// Entries describing everything a finished run did
    ///
    /// Dry-run outcomes are skipped: nothing happened to those files. Every
    /// entry carries the run's start time, which is what groups them into a
    /// [`JournalRun`] when read back.
    pub fn for_report(report: &CycleReport) -> Vec<Self> {
        let now = report.plan.now;
        let created = report.created.iter().map(|r| Self::created(r, now));
        let deletions = report
            .deletions
            .iter()
            .filter_map(|outcome| match &outcome.status {
                DeletionStatus::Deleted => {
                    Some(Self::deleted(&outcome.identifier, outcome.reason, now))
                }
                DeletionStatus::Failed(err) => {
                    Some(Self::delete_failed(&outcome.identifier, err.as_str(), now))
                }
                DeletionStatus::Skipped => None,
            });
        let rejected = report
            .rejected
            .iter()
            .map(|r| Self::rejected(&r.name, &r.reason, now));

        created.chain(deletions).chain(rejected).collect()
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.event,
            self.identifier
        );

        if let Some(detail) = &self.detail {
            output.push_str(&format!(" ({})", detail));
        }

        output
    }
}

/// The entries written by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRun {
    pub started: DateTime<Utc>,
    pub entries: Vec<JournalEntry>,
}

impl JournalRun {
    /// Number of entries of one kind
    pub fn count(&self, event: JournalEvent) -> usize {
        self.entries.iter().filter(|e| e.event == event).count()
    }

    /// One-line summary, e.g. `created 1, deleted 3, failed 0, rejected 0`
    pub fn summary(&self) -> String {
        format!(
            "created {}, deleted {}, failed {}, rejected {}",
            self.count(JournalEvent::Created),
            self.count(JournalEvent::Deleted),
            self.count(JournalEvent::DeleteFailed),
            self.count(JournalEvent::Rejected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_event_display() {
        assert_eq!(JournalEvent::Created.to_string(), "CREATED");
        assert_eq!(JournalEvent::DeleteFailed.to_string(), "DELETE FAILED");
    }

    #[test]
    fn test_deleted_entry_carries_reason() {
        let entry = JournalEntry::deleted("backup_x.tar", DeletionReason::Outdated, now());
        assert_eq!(entry.event, JournalEvent::Deleted);
        assert_eq!(entry.detail.as_deref(), Some("outdated"));
    }

    #[test]
    fn test_format_human_readable() {
        let record = BackupRecord::new(now(), "backup_2024-01-02_03-04-05.tar");
        let entry = JournalEntry::created(&record, now());
        assert_eq!(
            entry.format_human_readable(),
            "[2024-01-02 03:04:05 UTC] CREATED backup_2024-01-02_03-04-05.tar"
        );

        let failed = JournalEntry::delete_failed("b.tar", "permission denied", now());
        assert!(failed.format_human_readable().ends_with("(permission denied)"));
    }

    #[test]
    fn test_for_report_skips_dry_run_outcomes() {
        use crate::backup::{DeletionOutcome, RejectedEntry};
        use crate::retention::RetentionPlan;

        let record = BackupRecord::new(now(), "new.tar");
        let outcome = |id: &str, status| DeletionOutcome {
            identifier: id.to_string(),
            reason: DeletionReason::Redundant,
            status,
        };
        let report = CycleReport {
            created: Some(record),
            plan: RetentionPlan::empty(now()),
            deletions: vec![
                outcome("a.tar", DeletionStatus::Deleted),
                outcome("b.tar", DeletionStatus::Skipped),
                outcome("c.tar", DeletionStatus::Failed("busy".into())),
            ],
            rejected: vec![RejectedEntry {
                name: "backup_2024-02-30_00-00-00.tar".into(),
                reason: "bad timestamp".into(),
            }],
        };

        let entries = JournalEntry::for_report(&report);
        let events: Vec<JournalEvent> = entries.iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![
                JournalEvent::Created,
                JournalEvent::Deleted,
                JournalEvent::DeleteFailed,
                JournalEvent::Rejected
            ]
        );
        assert!(entries.iter().all(|e| e.timestamp == now()));
    }

    #[test]
    fn test_run_summary() {
        let run = JournalRun {
            started: now(),
            entries: vec![
                JournalEntry::deleted("a.tar", DeletionReason::Outdated, now()),
                JournalEntry::deleted("b.tar", DeletionReason::Redundant, now()),
            ],
        };
        assert_eq!(run.summary(), "created 0, deleted 2, failed 0, rejected 0");
    }

    #[test]
    fn test_serialization_skips_empty_detail() {
        let record = BackupRecord::new(now(), "a.tar");
        let json = serde_json::to_string(&JournalEntry::created(&record, now())).unwrap();
        assert!(!json.contains("detail"));
        assert!(json.contains("\"event\":\"created\""));
    }
}
