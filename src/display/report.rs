//! Run report display formatting

use crate::backup::{CycleReport, DeletionStatus};

/// Format the outcome of a run or prune
pub fn format_report(report: &CycleReport) -> String {
    let mut output = String::new();

    if let Some(created) = &report.created {
        output.push_str(&format!("Backup created: {}\n", created.identifier));
    }

    for outcome in &report.deletions {
        output.push_str(&format!(
            "  {} {} ({})\n",
            match outcome.status {
                DeletionStatus::Deleted => "deleted",
                DeletionStatus::Skipped => "would delete",
                DeletionStatus::Failed(_) => "FAILED to delete",
            },
            outcome.identifier,
            match &outcome.status {
                DeletionStatus::Failed(err) => format!("{}: {}", outcome.reason, err),
                _ => outcome.reason.to_string(),
            }
        ));
    }

    for rejected in &report.rejected {
        output.push_str(&format!(
            "  ignored {} ({})\n",
            rejected.name, rejected.reason
        ));
    }

    let skipped = report.deletions.len() - report.deleted_count() - report.failed_count();
    output.push_str(&format!(
        "Kept {} backup(s), deleted {}",
        report.plan.kept.len(),
        report.deleted_count()
    ));
    if skipped > 0 {
        output.push_str(&format!(", would delete {}", skipped));
    }
    if report.has_failures() {
        output.push_str(&format!(", {} failed (will retry next run)", report.failed_count()));
    }
    output.push('\n');

    output
}
