//! Journal file
//!
//! One JSON object per line, appended once per run. Reading is lenient: a
//! line that does not parse (typically one cut short by a crash) is skipped
//! with a warning so the rest of the history stays readable.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::backup::CycleReport;
use crate::error::BackupResult;

use super::entry::{JournalEntry, JournalRun};

/// Append-only journal of backup runs
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Record a finished run; returns the number of entries written
    ///
    /// A run that did nothing leaves the file untouched.
    pub fn append_run(&self, report: &CycleReport) -> BackupResult<usize> {
        let entries = JournalEntry::for_report(report);
        if entries.is_empty() {
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for entry in &entries {
            serde_json::to_writer(&mut writer, entry)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        Ok(entries.len())
    }

    /// Every readable entry, oldest first
    pub fn entries(&self) -> BackupResult<Vec<JournalEntry>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(
                        journal = %self.path.display(),
                        line = index + 1,
                        error = %err,
                        "skipping unreadable journal line"
                    );
                    None
                }
            })
            .collect())
    }

    /// The last `count` runs, oldest first
    pub fn recent_runs(&self, count: usize) -> BackupResult<Vec<JournalRun>> {
        let mut runs: Vec<JournalRun> = Vec::new();
        for entry in self.entries()? {
            match runs.last_mut() {
                Some(run) if run.started == entry.timestamp => run.entries.push(entry),
                _ => runs.push(JournalRun {
                    started: entry.timestamp,
                    entries: vec![entry],
                }),
            }
        }

        let start = runs.len().saturating_sub(count);
        Ok(runs.split_off(start))
    }
}
