//! Inventory display formatting

use chrono::{DateTime, Utc};

use crate::backup::Inventory;

use super::format::{format_age, format_size};

/// Format the backups in a directory, newest first
pub fn format_inventory(inventory: &Inventory, now: DateTime<Utc>) -> String {
    if inventory.is_empty() && inventory.rejected.is_empty() {
        return "No backups found.".to_string();
    }

    let mut output = String::new();

    if !inventory.is_empty() {
        let name_width = inventory
            .entries
            .iter()
            .map(|e| e.record.identifier.len())
            .max()
            .unwrap_or(4)
            .max(4);

        output.push_str(&format!(
            "{:<name_width$}  {:<23}  {:>8}  {:>10}\n",
            "File",
            "Created",
            "Age",
            "Size",
            name_width = name_width,
        ));
        output.push_str(&format!(
            "{:-<name_width$}  {:-<23}  {:->8}  {:->10}\n",
            "",
            "",
            "",
            "",
            name_width = name_width,
        ));

        for entry in inventory.entries.iter().rev() {
            output.push_str(&format!(
                "{:<name_width$}  {:<23}  {:>8}  {:>10}\n",
                entry.record.identifier,
                entry.record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                format_age(entry.record.age_secs(now)),
                format_size(entry.size_bytes),
                name_width = name_width,
            ));
        }

        output.push('\n');
        output.push_str(&format!(
            "Total: {} backup(s), {}\n",
            inventory.len(),
            format_size(inventory.total_size())
        ));
    }

    if !inventory.rejected.is_empty() {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str("Ignored (unparsable names, never deleted):\n");
        for rejected in &inventory.rejected {
            output.push_str(&format!("  {} - {}\n", rejected.name, rejected.reason));
        }
    }

    output
}
