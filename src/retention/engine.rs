//! Retention policy engine
//!
//! Pure decision logic: given a snapshot of backup records, the current time
//! and a policy, work out which records to delete. No I/O happens here.
//!
//! A pass runs three rules in order:
//!
//! 1. **Outdated horizon**: anything older than the horizon goes.
//! 2. **Thinning**: with the bucket strategy, each logarithmic age bucket keeps
//!    one record (the oldest, except the bucket holding the newest record,
//!    which keeps the newest). With the decay strategy, records are removed
//!    one at a time by best fit to an ideal schedule until the cap is met.
//! 3. **Max-kept cap**: while too many survive, the oldest survivor goes.
//!
//! One record is protected from every rule: the archive the current run just
//! created when there is one, otherwise the newest record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::BackupRecord;

use super::bucket::bucket_index;
use super::decay::select_victim;
use super::plan::{BucketAssignment, DeletionReason, PlannedDeletion, RetentionPlan};
use super::policy::{RetentionPolicy, RetentionStrategy};

/// Computes retention plans for a fixed policy
#[derive(Debug, Clone)]
pub struct RetentionEngine {
    policy: RetentionPolicy,
}

impl RetentionEngine {
    /// Create an engine for `policy`
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { policy }
    }

    /// The policy this engine applies
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Compute the retention plan for `records` as of `now`
    ///
    /// `records` may be in any order. Identical records (same timestamp and
    /// identifier) violate the inventory contract. The newest record is
    /// protected.
    pub fn plan(&self, records: &[BackupRecord], now: DateTime<Utc>) -> RetentionPlan {
        self.plan_protecting(records, now, None)
    }

    /// Compute the plan, protecting the record named `protected`
    ///
    /// A run passes the archive it just created. That archive is not always
    /// the newest by timestamp: a peer stamped after `now` (clock stepped
    /// back, names written in local time) would otherwise take its place as
    /// bucket 0's keeper. Falls back to the newest record when `protected`
    /// is `None` or names no record.
    pub fn plan_protecting(
        &self,
        records: &[BackupRecord],
        now: DateTime<Utc>,
        protected: Option<&str>,
    ) -> RetentionPlan {
        let mut sorted = records.to_vec();
        sorted.sort();
        debug_assert!(
            sorted.windows(2).all(|w| w[0] != w[1]),
            "duplicate backup records in retention input"
        );

        if sorted.is_empty() {
            return RetentionPlan::empty(now);
        }

        let interval_secs = self.policy.interval_secs();
        let ages: Vec<u64> = sorted.iter().map(|r| r.age_secs(now)).collect();
        let buckets: Vec<u32> = ages
            .iter()
            .map(|&age| bucket_index(age, interval_secs))
            .collect();

        let keeper = protected
            .and_then(|id| sorted.iter().position(|r| r.identifier == id))
            .unwrap_or(sorted.len() - 1);

        let mut fate: Vec<Option<DeletionReason>> = vec![None; sorted.len()];

        self.apply_horizon(&sorted, now, keeper, &mut fate);
        match self.policy.strategy() {
            RetentionStrategy::Buckets => thin_buckets(&buckets, keeper, &mut fate),
            RetentionStrategy::Decay => self.thin_decay(&sorted, now, keeper, &mut fate),
        }
        self.apply_cap(keeper, &mut fate);

        debug_assert!(fate[keeper].is_none());

        let mut plan = RetentionPlan::empty(now);
        for (i, record) in sorted.into_iter().enumerate() {
            plan.assignments.push(BucketAssignment {
                record: record.clone(),
                age_secs: ages[i],
                bucket: buckets[i],
                deletion: fate[i],
            });
            match fate[i] {
                Some(reason) => plan.deletions.push(PlannedDeletion { record, reason }),
                None => plan.kept.push(record),
            }
        }
        plan
    }

    fn apply_horizon(
        &self,
        sorted: &[BackupRecord],
        now: DateTime<Utc>,
        keeper: usize,
        fate: &mut [Option<DeletionReason>],
    ) {
        let horizon = self.policy.outdated_horizon();
        for (i, record) in sorted.iter().enumerate() {
            if i != keeper && record.age(now) > horizon {
                fate[i] = Some(DeletionReason::Outdated);
            }
        }
    }

    fn thin_decay(
        &self,
        sorted: &[BackupRecord],
        now: DateTime<Utc>,
        keeper: usize,
        fate: &mut [Option<DeletionReason>],
    ) {
        let max_kept = self.policy.max_kept();
        loop {
            let survivors: Vec<usize> = survivors(fate);
            if survivors.len() <= max_kept {
                return;
            }
            let timestamps: Vec<i64> = survivors
                .iter()
                .map(|&i| sorted[i].timestamp.timestamp())
                .collect();
            let exempt = survivors.iter().position(|&i| i == keeper);
            match select_victim(
                &timestamps,
                now.timestamp(),
                self.policy.interval_secs(),
                exempt,
            ) {
                Some(pos) => fate[survivors[pos]] = Some(DeletionReason::Redundant),
                // No interior candidate left; the cap handles the rest.
                None => return,
            }
        }
    }

    fn apply_cap(&self, keeper: usize, fate: &mut [Option<DeletionReason>]) {
        let survivors = survivors(fate);
        let excess = survivors.len().saturating_sub(self.policy.max_kept());
        // max_kept >= 1, so the other survivors always cover the excess.
        for &i in survivors.iter().filter(|&&i| i != keeper).take(excess) {
            fate[i] = Some(DeletionReason::OverCapacity);
        }
    }
}

/// Keep one record per bucket among the records still alive
///
/// The bucket holding the protected record keeps it; every other bucket
/// keeps its oldest member, which is the one that will age into the next
/// bucket.
fn thin_buckets(buckets: &[u32], keeper: usize, fate: &mut [Option<DeletionReason>]) {
    let mut members: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for i in survivors(fate) {
        members.entry(buckets[i]).or_default().push(i);
    }

    for indices in members.values() {
        let keep = if indices.contains(&keeper) {
            keeper
        } else {
            indices[0]
        };
        for &i in indices {
            if i != keep {
                fate[i] = Some(DeletionReason::Redundant);
            }
        }
    }
}

fn survivors(fate: &[Option<DeletionReason>]) -> Vec<usize> {
    fate.iter()
        .enumerate()
        .filter(|(_, f)| f.is_none())
        .map(|(i, _)| i)
        .collect()
}
