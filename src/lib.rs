//! logbackup - directory backups with logarithmic retention
//!
//! Archives a source directory into timestamped tarballs and prunes old
//! archives so that the backups kept are spaced roughly exponentially in
//! age: dense for recent history, sparse for old history.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `retention`: The pure retention engine (age buckets, policy, plans)
//! - `models`: Backup records and the archive naming convention
//! - `backup`: Inventory, archive creation, deletion and the run cycle
//! - `journal`: Append-only JSONL record of what each run did
//! - `config`: Settings, durations and config file resolution
//! - `display`: Table formatting for the CLI
//! - `cli`: Argument parsing and command handlers
//! - `logging`: Diagnostic logging setup
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use logbackup::retention::{RetentionEngine, RetentionPolicy};
//!
//! let engine = RetentionEngine::new(RetentionPolicy::default());
//! let plan = engine.plan(&records, chrono::Utc::now());
//! for deletion in &plan.deletions {
//!     println!("{} ({})", deletion.record, deletion.reason);
//! }
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod journal;
pub mod logging;
pub mod models;
pub mod retention;

pub use error::{BackupError, BackupResult};
