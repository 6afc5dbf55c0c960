//! Config file location for logbackup
//!
//! ## Resolution Order
//!
//! 1. `--config <file>` on the command line
//! 2. `LOGBACKUP_CONFIG` environment variable (if set)
//! 3. The platform config directory: `$XDG_CONFIG_HOME/logbackup/config.json`
//!    on Linux, `~/Library/Application Support/logbackup/config.json` on macOS,
//!    `%APPDATA%\logbackup\config\config.json` on Windows
//!
//! The first two must point at an existing file. The platform default is
//! only used when it exists; without it, built-in defaults apply.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::BackupError;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "LOGBACKUP_CONFIG";

/// Where the settings for this invocation come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file given explicitly (flag or environment)
    Explicit(PathBuf),
    /// The platform default file, which exists
    Default(PathBuf),
    /// No file; built-in defaults only
    BuiltIn,
}

impl ConfigSource {
    /// Resolve the config source for this invocation
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested file does not exist.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, BackupError> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        if let Some(path) = requested {
            if !path.is_file() {
                return Err(BackupError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::Explicit(path));
        }

        Ok(match default_config_file() {
            Some(path) if path.is_file() => Self::Default(path),
            _ => Self::BuiltIn,
        })
    }

    /// Path of the file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Default(path) => Some(path),
            Self::BuiltIn => None,
        }
    }
}

/// The platform default config file path (may not exist)
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "logbackup").map(|dirs| dirs.config_dir().join("config.json"))
}
