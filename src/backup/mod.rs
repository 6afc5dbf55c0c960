//! Backup I/O for logbackup
//!
//! Everything that touches the backup directory lives here; the retention
//! decision itself is in [`crate::retention`].
//!
//! # Architecture
//!
//! - `Inventory`: lists archives for a prefix and parses their timestamps
//! - `ArchiveCreator`: writes a new tar (or tar.gz) of the source directory
//! - `DeletionExecutor`: removes what a retention plan selects
//! - `RunLock`: keeps overlapping invocations off the same directory
//! - `BackupCycle`: runs the above in order and reports the outcome
//!
//! # Example
//!
//! ```rust,ignore
//! use logbackup::backup::BackupCycle;
//! use logbackup::config::Settings;
//!
//! let cycle = BackupCycle::from_settings(&settings)?;
//! let report = cycle.run(chrono::Utc::now())?;
//! println!("kept {}, deleted {}", report.plan.kept.len(), report.deleted_count());
//! ```

mod archive;
mod cycle;
mod deletion;
mod inventory;
mod lock;

pub use archive::ArchiveCreator;
pub use cycle::{BackupCycle, CycleReport};
pub use deletion::{DeletionExecutor, DeletionOutcome, DeletionStatus};
pub use inventory::{Inventory, InventoryEntry, RejectedEntry};
pub use lock::RunLock;
