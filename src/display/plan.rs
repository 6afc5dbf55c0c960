//! Retention plan display formatting
//!
//! Shows every backup with its age bucket and what the plan does to it.

use crate::retention::{bucket_bounds_secs, DeletionReason, RetentionPlan, RetentionPolicy};

use super::format::format_age;

/// Format a retention plan as a table, oldest backup first
pub fn format_plan(plan: &RetentionPlan, policy: &RetentionPolicy) -> String {
    if plan.assignments.is_empty() {
        return "No backups found.".to_string();
    }

    let interval = policy.interval_secs();
    let ranges: Vec<String> = plan
        .assignments
        .iter()
        .map(|a| {
            let (start, end) = bucket_bounds_secs(a.bucket, interval);
            format!("{}..{}", format_age(start), format_age(end))
        })
        .collect();

    let name_width = plan
        .assignments
        .iter()
        .map(|a| a.record.identifier.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let range_width = ranges.iter().map(String::len).max().unwrap_or(5).max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>6}  {:<range_width$}  {:>8}  {:<name_width$}  {}\n",
        "Bucket",
        "Range",
        "Age",
        "File",
        "Action",
        range_width = range_width,
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:->6}  {:-<range_width$}  {:->8}  {:-<name_width$}  {:-<20}\n",
        "",
        "",
        "",
        "",
        "",
        range_width = range_width,
        name_width = name_width,
    ));

    for (assignment, range) in plan.assignments.iter().zip(&ranges) {
        let action = match assignment.deletion {
            None => "keep".to_string(),
            Some(reason) => format!("delete ({})", reason),
        };
        output.push_str(&format!(
            "{:>6}  {:<range_width$}  {:>8}  {:<name_width$}  {}\n",
            assignment.bucket,
            range,
            format_age(assignment.age_secs),
            assignment.record.identifier,
            action,
            range_width = range_width,
            name_width = name_width,
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "Keep {}, delete {} (outdated: {}, redundant: {}, over capacity: {})\n",
        plan.kept.len(),
        plan.deletions.len(),
        plan.count_by_reason(DeletionReason::Outdated),
        plan.count_by_reason(DeletionReason::Redundant),
        plan.count_by_reason(DeletionReason::OverCapacity),
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BackupRecord;
    use crate::retention::RetentionEngine;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_format_plan() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let records: Vec<BackupRecord> = (0..3)
            .map(|d| BackupRecord::new(now - Duration::days(d), format!("b{}.tar", d)))
            .collect();
        let policy = RetentionPolicy::default();
        let plan = RetentionEngine::new(policy.clone()).plan(&records, now);

        let output = format_plan(&plan, &policy);
        assert!(output.contains("Bucket"));
        assert!(output.contains("b1.tar"));
        assert!(output.contains("delete (redundant)"));
        assert!(output.contains("1d..3d"));
        assert!(output.contains("Keep 2, delete 1"));
    }

    #[test]
    fn test_format_empty_plan() {
        let plan = RetentionPlan::empty(Utc::now());
        assert_eq!(
            format_plan(&plan, &RetentionPolicy::default()),
            "No backups found."
        );
    }
}
