//! Inventory of existing backups
//!
//! Lists the backup directory and turns every archive carrying our prefix
//! into a backup record. Names that look like ours but do not parse are
//! kept aside and reported; they are never handed to the retention engine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BackupError, BackupResult};
use crate::models::{BackupNaming, BackupRecord};

/// An archive found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub record: BackupRecord,
    /// Size in bytes
    pub size_bytes: u64,
}

/// A file that matched the backup pattern but could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    /// File name as found on disk
    pub name: String,
    /// Why it was rejected
    pub reason: String,
}

/// Every backup for one prefix in one directory, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub entries: Vec<InventoryEntry>,
    pub rejected: Vec<RejectedEntry>,
}

impl Inventory {
    /// Collect the inventory of `dir`
    ///
    /// A missing directory yields an empty inventory.
    pub fn collect(dir: &Path, naming: &BackupNaming) -> BackupResult<Self> {
        let mut inventory = Inventory::default();

        if !dir.exists() {
            debug!(dir = %dir.display(), "backup directory does not exist yet");
            return Ok(inventory);
        }

        for entry in fs::read_dir(dir).map_err(|e| {
            BackupError::Io(format!(
                "Failed to read backup directory {}: {}",
                dir.display(),
                e
            ))
        })? {
            let entry = entry.map_err(|e| {
                BackupError::Io(format!("Failed to read directory entry: {}", e))
            })?;

            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !naming.matches(&name) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    warn!(file = %name, error = %e, "cannot stat backup, skipping");
                    inventory.rejected.push(RejectedEntry {
                        name,
                        reason: format!("cannot read metadata: {}", e),
                    });
                    continue;
                }
            };

            match naming.parse(&name) {
                Ok(record) => inventory.entries.push(InventoryEntry {
                    record,
                    size_bytes: metadata.len(),
                }),
                Err(err) => {
                    warn!(file = %name, error = %err, "ignoring backup with unparsable name");
                    let reason = match err {
                        BackupError::InvalidName { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    inventory.rejected.push(RejectedEntry { name, reason });
                }
            }
        }

        inventory.entries.sort_by(|a, b| a.record.cmp(&b.record));
        inventory.rejected.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(inventory)
    }

    /// Records handed to the retention engine
    pub fn records(&self) -> Vec<BackupRecord> {
        self.entries.iter().map(|e| e.record.clone()).collect()
    }

    /// The most recent backup
    pub fn newest(&self) -> Option<&BackupRecord> {
        self.entries.last().map(|e| &e.record)
    }

    /// Size of the backup named `identifier`
    pub fn size_of(&self, identifier: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.record.identifier == identifier)
            .map(|e| e.size_bytes)
    }

    /// Total size of all backups
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
