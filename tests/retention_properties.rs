//! Property-based tests for retention engine invariants.
//!
//! These tests use proptest to check that the engine's guarantees hold
//! across randomly generated backup histories and policies.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use logbackup::models::BackupRecord;
use logbackup::retention::{
    bucket_index, RetentionEngine, RetentionPlan, RetentionPolicy, RetentionStrategy,
};

const DAY: i64 = 86_400;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Generates a backup history as ages in seconds, up to three years old.
fn arb_ages() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..3 * 365 * DAY, 1..60)
}

fn arb_strategy() -> impl Strategy<Value = RetentionStrategy> {
    prop_oneof![
        Just(RetentionStrategy::Buckets),
        Just(RetentionStrategy::Decay)
    ]
}

/// Generates a valid policy: interval 1h..2d, cap 1..20, horizon 1d..1000d.
fn arb_policy() -> impl Strategy<Value = RetentionPolicy> {
    (3_600i64..2 * DAY, 1usize..20, 1i64..1_000, arb_strategy()).prop_map(
        |(interval, max_kept, horizon_days, strategy)| {
            RetentionPolicy::new(
                Duration::seconds(interval),
                max_kept,
                Duration::days(horizon_days),
            )
            .unwrap()
            .with_strategy(strategy)
        },
    )
}

fn records(ages: &[i64]) -> Vec<BackupRecord> {
    ages.iter()
        .enumerate()
        .map(|(i, &age)| BackupRecord::new(now() - Duration::seconds(age), format!("b{:04}.tar", i)))
        .collect()
}

fn newest(records: &[BackupRecord]) -> BackupRecord {
    records.iter().max().cloned().unwrap()
}

fn plan(policy: &RetentionPolicy, records: &[BackupRecord]) -> RetentionPlan {
    RetentionEngine::new(policy.clone()).plan(records, now())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The newest backup always survives.
    #[test]
    fn prop_newest_survives(ages in arb_ages(), policy in arb_policy()) {
        let records = records(&ages);
        let plan = plan(&policy, &records);
        prop_assert!(plan.kept.contains(&newest(&records)));
    }

    /// Every record is either kept or deleted, exactly once.
    #[test]
    fn prop_plan_partitions_input(ages in arb_ages(), policy in arb_policy()) {
        let records = records(&ages);
        let plan = plan(&policy, &records);

        prop_assert_eq!(plan.kept.len() + plan.deletions.len(), records.len());
        prop_assert_eq!(plan.assignments.len(), records.len());

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for id in plan.kept.iter().map(|r| r.identifier.as_str()).chain(plan.deleted_identifiers()) {
            prop_assert!(seen.insert(id), "{} appears twice", id);
        }
    }

    /// Never more survivors than the cap.
    #[test]
    fn prop_cap_holds(ages in arb_ages(), policy in arb_policy()) {
        let plan = plan(&policy, &records(&ages));
        prop_assert!(plan.kept.len() <= policy.max_kept());
    }

    /// Nothing older than the horizon survives except the newest backup.
    #[test]
    fn prop_horizon_holds(ages in arb_ages(), policy in arb_policy()) {
        let records = records(&ages);
        let newest = newest(&records);
        let plan = plan(&policy, &records);

        for record in plan.kept.iter().filter(|r| **r != newest) {
            prop_assert!(record.age(now()) <= policy.outdated_horizon());
        }
    }

    /// The bucket strategy keeps at most one backup per age bucket.
    #[test]
    fn prop_one_survivor_per_bucket(ages in arb_ages(), policy in arb_policy()) {
        let policy = policy.with_strategy(RetentionStrategy::Buckets);
        let plan = plan(&policy, &records(&ages));

        let mut per_bucket: BTreeMap<u32, usize> = BTreeMap::new();
        for assignment in plan.assignments.iter().filter(|a| a.is_kept()) {
            *per_bucket.entry(assignment.bucket).or_default() += 1;
        }
        prop_assert!(per_bucket.values().all(|&n| n == 1), "{:?}", per_bucket);
    }

    /// Without horizon or cap pressure, exactly one backup per occupied
    /// bucket survives: gaps in the history never cost extra backups.
    #[test]
    fn prop_every_occupied_bucket_keeps_one(ages in arb_ages(), interval in 3_600i64..2 * DAY) {
        let policy = RetentionPolicy::new(
            Duration::seconds(interval),
            1_000,
            Duration::days(10 * 365),
        )
        .unwrap();
        let records = records(&ages);
        let plan = plan(&policy, &records);

        let occupied: BTreeSet<u32> = records
            .iter()
            .map(|r| bucket_index(r.age_secs(now()), policy.interval_secs()))
            .collect();
        prop_assert_eq!(plan.kept.len(), occupied.len());
    }

    /// Planning again over the survivors deletes nothing.
    #[test]
    fn prop_idempotent(ages in arb_ages(), policy in arb_policy()) {
        let first = plan(&policy, &records(&ages));
        let second = plan(&policy, &first.kept);

        prop_assert!(second.is_noop(), "second pass deleted {:?}", second.deleted_identifiers());
        prop_assert_eq!(second.kept.len(), first.kept.len());
    }

    /// Input order does not matter.
    #[test]
    fn prop_order_independent(ages in arb_ages(), policy in arb_policy()) {
        let forward = records(&ages);
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = plan(&policy, &forward);
        let b = plan(&policy, &reversed);
        prop_assert_eq!(a.kept, b.kept);
        prop_assert_eq!(a.deletions, b.deletions);
    }
}
