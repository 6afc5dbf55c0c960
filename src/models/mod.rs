//! Core data models for logbackup
//!
//! This module contains the data structures shared by the retention engine
//! and the I/O layer: backup records and the archive naming convention.

pub mod naming;
pub mod record;

pub use naming::{ArchiveFormat, BackupNaming, TIMESTAMP_FORMAT};
pub use record::BackupRecord;
