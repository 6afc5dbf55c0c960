//! Archive creation
//!
//! Archives the source directory with the system `tar`. A run only prunes
//! once this has succeeded: deleting history without a fresh backup to
//! replace it would risk losing data.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use crate::error::{BackupError, BackupResult};
use crate::models::{ArchiveFormat, BackupNaming, BackupRecord};

/// Creates new archives of a source directory
#[derive(Debug, Clone)]
pub struct ArchiveCreator {
    src_dir: PathBuf,
    bkp_dir: PathBuf,
    naming: BackupNaming,
    program: OsString,
}

impl ArchiveCreator {
    /// Create an archive creator writing into `bkp_dir`
    pub fn new(src_dir: impl Into<PathBuf>, bkp_dir: impl Into<PathBuf>, naming: BackupNaming) -> Self {
        Self {
            src_dir: src_dir.into(),
            bkp_dir: bkp_dir.into(),
            naming,
            program: OsString::from("tar"),
        }
    }

    /// Use a different `tar` executable
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    /// Archive the source directory as of `now`
    ///
    /// Returns the record of the new archive. Its timestamp is `now`
    /// truncated to whole seconds, matching what the file name encodes.
    pub fn create(&self, now: DateTime<Utc>) -> BackupResult<BackupRecord> {
        if !self.src_dir.is_dir() {
            return Err(BackupError::Archive(format!(
                "source directory {} does not exist",
                self.src_dir.display()
            )));
        }

        fs::create_dir_all(&self.bkp_dir).map_err(|e| {
            BackupError::Archive(format!(
                "Failed to create backup directory {}: {}",
                self.bkp_dir.display(),
                e
            ))
        })?;

        let timestamp = now.trunc_subsecs(0);
        let file_name = self.naming.file_name(timestamp);
        let target = self.bkp_dir.join(&file_name);

        if target.exists() {
            return Err(BackupError::Archive(format!(
                "{} already exists",
                target.display()
            )));
        }

        let flags = match self.naming.format() {
            ArchiveFormat::Tar => "-cf",
            ArchiveFormat::TarGz => "-czf",
        };

        debug!(
            program = ?self.program,
            target = %target.display(),
            source = %self.src_dir.display(),
            "running tar"
        );

        let output = Command::new(&self.program)
            .arg(flags)
            .arg(&target)
            .arg("-C")
            .arg(&self.src_dir)
            .arg(".")
            .output()
            .map_err(|e| {
                let _ = fs::remove_file(&target);
                BackupError::Archive(format!("Failed to run {:?}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let _ = fs::remove_file(&target);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackupError::Archive(format!(
                "Failed to back up {} into {} ({}): {}",
                self.src_dir.display(),
                target.display(),
                output.status,
                stderr.trim()
            )));
        }

        info!(
            source = %self.src_dir.display(),
            archive = %target.display(),
            "backup created"
        );

        Ok(BackupRecord::new(timestamp, file_name))
    }
}
