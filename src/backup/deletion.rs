//! Deletion of pruned backups
//!
//! Applies a retention plan to the backup directory. A file that cannot be
//! removed is reported and skipped; the next run will find it again and
//! re-evaluate it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::retention::{DeletionReason, RetentionPlan};

/// What happened to one planned deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum DeletionStatus {
    Deleted,
    /// Dry run; the file was left alone
    Skipped,
    Failed(String),
}

impl fmt::Display for DeletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionStatus::Deleted => write!(f, "deleted"),
            DeletionStatus::Skipped => write!(f, "would delete"),
            DeletionStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Outcome of deleting one backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    pub identifier: String,
    pub reason: DeletionReason,
    pub status: DeletionStatus,
}

impl DeletionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, DeletionStatus::Failed(_))
    }
}

/// Removes backups named by a retention plan
#[derive(Debug, Clone)]
pub struct DeletionExecutor {
    bkp_dir: PathBuf,
    dry_run: bool,
}

impl DeletionExecutor {
    pub fn new(bkp_dir: impl Into<PathBuf>) -> Self {
        Self {
            bkp_dir: bkp_dir.into(),
            dry_run: false,
        }
    }

    /// Report what would be deleted without touching anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Delete every backup the plan selects
    ///
    /// Never stops early: each deletion is attempted and reported.
    pub fn execute(&self, plan: &RetentionPlan) -> Vec<DeletionOutcome> {
        plan.deletions
            .iter()
            .map(|d| self.delete(&d.record.identifier, d.reason))
            .collect()
    }

    fn delete(&self, identifier: &str, reason: DeletionReason) -> DeletionOutcome {
        let status = if self.dry_run {
            DeletionStatus::Skipped
        } else {
            match self.remove(identifier) {
                Ok(path) => {
                    info!(file = %path.display(), %reason, "removed backup");
                    DeletionStatus::Deleted
                }
                Err(err) => {
                    warn!(file = identifier, error = %err, "failed to remove backup");
                    DeletionStatus::Failed(err)
                }
            }
        };

        DeletionOutcome {
            identifier: identifier.to_string(),
            reason,
            status,
        }
    }

    fn remove(&self, identifier: &str) -> Result<PathBuf, String> {
        // Identifiers are bare file names; anything else never came from
        // the inventory.
        if Path::new(identifier).file_name().and_then(|n| n.to_str()) != Some(identifier) {
            return Err(format!("refusing to delete non-local path '{}'", identifier));
        }

        let path = self.bkp_dir.join(identifier);
        fs::remove_file(&path)
            .map(|_| path)
            .map_err(|e| e.to_string())
    }
}
