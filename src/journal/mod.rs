//! Run journal for logbackup
//!
//! Records what each run did to a backup directory in an append-only
//! journal kept next to the archives.
//!
//! # Architecture
//!
//! - `JournalEntry`: one event (archive created, backup deleted, deletion
//!   failed, name rejected) stamped with the start time of its run.
//! - `JournalRun`: the entries of one run, as read back.
//! - `Journal`: appends a finished run's entries as JSON lines and reads
//!   them back grouped by run.
//!
//! # Example
//!
//! ```rust,ignore
//! use logbackup::journal::Journal;
//!
//! let journal = Journal::new(bkp_dir.join("backup.journal.jsonl"));
//! journal.append_run(&report)?;
//!
//! for run in journal.recent_runs(5)? {
//!     println!("{}: {}", run.started, run.summary());
//! }
//! ```

mod entry;
mod logger;

pub use entry::{JournalEntry, JournalEvent, JournalRun};
pub use logger::Journal;
