//! Settings for logbackup
//!
//! Everything a run needs: where to read from, where archives live, how they
//! are named, and the retention policy. Settings come from an optional JSON
//! or YAML file and are then overridden by command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::duration::ConfigDuration;
use crate::error::{BackupError, BackupResult};
use crate::models::{ArchiveFormat, BackupNaming};
use crate::retention::{RetentionPolicy, RetentionStrategy};

/// Settings for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory whose contents are archived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<PathBuf>,

    /// Directory holding the archives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bkp_dir: Option<PathBuf>,

    /// Archive name prefix; several prefixes can share one directory
    #[serde(default = "default_prefix")]
    pub bkp_prefix: String,

    /// Nominal spacing between backups
    #[serde(default = "default_interval")]
    pub expected_interval: ConfigDuration,

    /// Maximum number of backups kept
    #[serde(default = "default_max_kept")]
    pub max_kept: usize,

    /// Age past which a backup is always deleted
    #[serde(default = "default_horizon")]
    pub outdated_horizon: ConfigDuration,

    /// Gzip-compress new archives
    #[serde(default)]
    pub compress: bool,

    /// How surplus backups are chosen
    #[serde(default)]
    pub strategy: RetentionStrategy,

    /// Record each run in the backup directory's journal
    #[serde(default = "default_journal")]
    pub journal: bool,
}

fn default_prefix() -> String {
    "backup".to_string()
}

fn default_interval() -> ConfigDuration {
    ConfigDuration::seconds(RetentionPolicy::DEFAULT_INTERVAL_SECS)
}

fn default_max_kept() -> usize {
    RetentionPolicy::DEFAULT_MAX_KEPT
}

fn default_horizon() -> ConfigDuration {
    ConfigDuration::seconds(RetentionPolicy::DEFAULT_HORIZON_SECS)
}

fn default_journal() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            src_dir: None,
            bkp_dir: None,
            bkp_prefix: default_prefix(),
            expected_interval: default_interval(),
            max_kept: default_max_kept(),
            outdated_horizon: default_horizon(),
            compress: false,
            strategy: RetentionStrategy::default(),
            journal: default_journal(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON or YAML file, chosen by extension
    pub fn load(path: &Path) -> BackupResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Io(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let settings = if is_yaml(path) {
            serde_yaml::from_str(&contents).map_err(|e| {
                BackupError::Config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            serde_json::from_str(&contents).map_err(|e| {
                BackupError::Config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?
        };

        Ok(settings)
    }

    /// Load settings from `path`, or use defaults when there is none
    pub fn load_or_default(path: Option<&Path>) -> BackupResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save settings to `path` as JSON or YAML, chosen by extension
    pub fn save(&self, path: &Path) -> BackupResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BackupError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };

        std::fs::write(path, contents)
            .map_err(|e| BackupError::Io(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validated retention policy
    pub fn policy(&self) -> BackupResult<RetentionPolicy> {
        Ok(RetentionPolicy::new(
            self.expected_interval.as_duration(),
            self.max_kept,
            self.outdated_horizon.as_duration(),
        )?
        .with_strategy(self.strategy))
    }

    /// Naming convention for this prefix
    pub fn naming(&self) -> BackupResult<BackupNaming> {
        let prefix = self.bkp_prefix.trim();
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(BackupError::Config(format!(
                "invalid backup prefix '{}'",
                self.bkp_prefix
            )));
        }
        Ok(BackupNaming::new(
            prefix,
            ArchiveFormat::from_compress(self.compress),
        ))
    }

    /// The backup directory, which every command needs
    pub fn require_bkp_dir(&self) -> BackupResult<&Path> {
        self.bkp_dir
            .as_deref()
            .ok_or_else(|| BackupError::Config("backup directory is not set (--bkp-dir)".into()))
    }

    /// The source directory, needed only to create archives
    pub fn require_src_dir(&self) -> BackupResult<&Path> {
        self.src_dir
            .as_deref()
            .ok_or_else(|| BackupError::Config("source directory is not set (--src-dir)".into()))
    }

    /// Fail fast on anything that would make a run meaningless
    pub fn validate(&self) -> BackupResult<()> {
        self.policy()?;
        self.naming()?;
        self.require_bkp_dir()?;
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.bkp_prefix, "backup");
        assert_eq!(settings.max_kept, 14);
        assert!(!settings.compress);
        assert!(settings.journal);

        let policy = settings.policy().unwrap();
        assert_eq!(policy.expected_interval(), Duration::days(1));
        assert_eq!(policy.outdated_horizon(), Duration::days(730));
    }

    #[test]
    fn test_load_json_with_partial_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"bkp_dir": "/srv/backups", "expected_interval": "6h", "max_kept": 20}"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.bkp_dir, Some(PathBuf::from("/srv/backups")));
        assert_eq!(settings.expected_interval.as_duration(), Duration::hours(6));
        assert_eq!(settings.max_kept, 20);
        assert_eq!(settings.bkp_prefix, "backup");
    }

    #[test]
    fn test_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "bkp_prefix: db\noutdated_horizon: 3600\ncompress: true\nstrategy: decay\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.bkp_prefix, "db");
        assert_eq!(settings.outdated_horizon.as_duration(), Duration::hours(1));
        assert!(settings.compress);
        assert_eq!(settings.strategy, RetentionStrategy::Decay);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"expected_interval": "soon"}"#).unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yml");

        let mut settings = Settings::default();
        settings.max_kept = 7;
        settings.compress = true;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_validate_requires_bkp_dir() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_err());

        settings.bkp_dir = Some(PathBuf::from("/tmp"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_policy_fails_validation() {
        let mut settings = Settings {
            bkp_dir: Some(PathBuf::from("/tmp")),
            ..Settings::default()
        };
        settings.max_kept = 0;
        assert!(settings.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_prefix_with_separator_rejected() {
        let settings = Settings {
            bkp_prefix: "../evil".into(),
            ..Settings::default()
        };
        assert!(settings.naming().is_err());
    }
}
