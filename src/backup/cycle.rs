//! Backup cycle: one complete invocation against a backup directory
//!
//! Ties the pieces together in the only order that is safe:
//! lock, inventory, archive, plan, delete, journal.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{BackupError, BackupResult};
use crate::journal::Journal;
use crate::models::{BackupNaming, BackupRecord};
use crate::retention::{RetentionEngine, RetentionPlan, RetentionPolicy};

use super::archive::ArchiveCreator;
use super::deletion::{DeletionExecutor, DeletionOutcome, DeletionStatus};
use super::inventory::{Inventory, RejectedEntry};
use super::lock::RunLock;

/// What a run or prune did
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// The archive created by this run, if any
    pub created: Option<BackupRecord>,
    /// The retention plan that was applied
    pub plan: RetentionPlan,
    /// Outcome of every planned deletion
    pub deletions: Vec<DeletionOutcome>,
    /// Files that matched the pattern but were left alone
    pub rejected: Vec<RejectedEntry>,
}

impl CycleReport {
    /// Number of backups actually removed
    pub fn deleted_count(&self) -> usize {
        self.deletions
            .iter()
            .filter(|d| d.status == DeletionStatus::Deleted)
            .count()
    }

    /// Number of deletions that failed
    pub fn failed_count(&self) -> usize {
        self.deletions.iter().filter(|d| d.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

/// Runs backup cycles for one prefix in one directory
#[derive(Debug, Clone)]
pub struct BackupCycle {
    bkp_dir: PathBuf,
    src_dir: Option<PathBuf>,
    naming: BackupNaming,
    engine: RetentionEngine,
    journal: Option<Journal>,
}

impl BackupCycle {
    /// Create a cycle over `bkp_dir` with no source and no journal
    pub fn new(bkp_dir: impl Into<PathBuf>, naming: BackupNaming, policy: RetentionPolicy) -> Self {
        Self {
            bkp_dir: bkp_dir.into(),
            src_dir: None,
            naming,
            engine: RetentionEngine::new(policy),
            journal: None,
        }
    }

    /// Build a cycle from validated settings
    ///
    /// Fails before touching the filesystem if the policy, prefix or backup
    /// directory is invalid.
    pub fn from_settings(settings: &Settings) -> BackupResult<Self> {
        settings.validate()?;
        let cycle = Self::new(
            settings.require_bkp_dir()?,
            settings.naming()?,
            settings.policy()?,
        )
        .with_journal(settings.journal);

        Ok(match &settings.src_dir {
            Some(src) => cycle.with_source(src),
            None => cycle,
        })
    }

    /// Directory to archive on `run`
    pub fn with_source(mut self, src_dir: impl Into<PathBuf>) -> Self {
        self.src_dir = Some(src_dir.into());
        self
    }

    /// Enable or disable the run journal
    pub fn with_journal(mut self, enabled: bool) -> Self {
        self.journal =
            enabled.then(|| Journal::new(self.bkp_dir.join(self.naming.journal_file_name())));
        self
    }

    pub fn bkp_dir(&self) -> &Path {
        &self.bkp_dir
    }

    pub fn naming(&self) -> &BackupNaming {
        &self.naming
    }

    pub fn policy(&self) -> &RetentionPolicy {
        self.engine.policy()
    }

    pub fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    /// Collect the current inventory
    pub fn inventory(&self) -> BackupResult<Inventory> {
        Inventory::collect(&self.bkp_dir, &self.naming)
    }

    /// Compute the plan for the backups on disk, changing nothing
    pub fn plan(&self, now: DateTime<Utc>) -> BackupResult<(Inventory, RetentionPlan)> {
        let inventory = self.inventory()?;
        let plan = self.engine.plan(&inventory.records(), now);
        log_assignments(&plan);
        Ok((inventory, plan))
    }

    /// Archive the source directory, then prune
    ///
    /// If archiving fails nothing is pruned.
    pub fn run(&self, now: DateTime<Utc>) -> BackupResult<CycleReport> {
        let src_dir = self
            .src_dir
            .as_ref()
            .ok_or_else(|| BackupError::Config("source directory is not set (--src-dir)".into()))?;

        let _lock = RunLock::acquire(&self.bkp_dir, &self.naming)?;
        let inventory = self.inventory()?;

        let created = ArchiveCreator::new(src_dir, &self.bkp_dir, self.naming.clone()).create(now)?;

        let mut records = inventory.records();
        records.push(created.clone());

        Ok(self.apply(records, inventory.rejected, Some(created), now, false))
    }

    /// Prune without creating a new archive
    ///
    /// The newest existing backup is treated as the latest state and kept.
    pub fn prune(&self, now: DateTime<Utc>, dry_run: bool) -> BackupResult<CycleReport> {
        let _lock = RunLock::acquire(&self.bkp_dir, &self.naming)?;
        let inventory = self.inventory()?;
        let records = inventory.records();

        Ok(self.apply(records, inventory.rejected, None, now, dry_run))
    }

    fn apply(
        &self,
        records: Vec<BackupRecord>,
        rejected: Vec<RejectedEntry>,
        created: Option<BackupRecord>,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> CycleReport {
        // The archive this run created survives the pass even when a peer
        // carries a later timestamp.
        let protected = created.as_ref().map(|r| r.identifier.as_str());
        let plan = self.engine.plan_protecting(&records, now, protected);
        log_assignments(&plan);

        let deletions = DeletionExecutor::new(&self.bkp_dir)
            .dry_run(dry_run)
            .execute(&plan);

        let report = CycleReport {
            created,
            plan,
            deletions,
            rejected,
        };

        info!(
            kept = report.plan.kept.len(),
            deleted = report.deleted_count(),
            failed = report.failed_count(),
            dry_run,
            "retention pass complete"
        );

        if !dry_run {
            self.record(&report);
        }
        report
    }

    fn record(&self, report: &CycleReport) {
        let Some(journal) = &self.journal else {
            return;
        };
        if let Err(err) = journal.append_run(report) {
            warn!(journal = %journal.path().display(), error = %err, "failed to write journal");
        }
    }
}

fn log_assignments(plan: &RetentionPlan) {
    for assignment in &plan.assignments {
        let fate = assignment
            .deletion
            .map_or_else(|| "keep".to_string(), |r| r.to_string());
        debug!(
            file = %assignment.record.identifier,
            age_secs = assignment.age_secs,
            bucket = assignment.bucket,
            %fate,
            "bucket assignment"
        );
    }
}
