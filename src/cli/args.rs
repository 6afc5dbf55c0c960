//! Global command-line options
//!
//! Every option can also come from a `LOGBACKUP_*` environment variable.
//! Options override the config file, which overrides built-in defaults.

use std::path::PathBuf;

use clap::Args;

use crate::config::{ConfigDuration, Settings};
use crate::logging::{LogFormat, LogLevel};
use crate::retention::RetentionStrategy;

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Directory to archive
    #[arg(short, long, global = true, env = "LOGBACKUP_SRC_DIR", value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Directory holding the archives
    #[arg(short, long, global = true, env = "LOGBACKUP_BKP_DIR", value_name = "DIR")]
    pub bkp_dir: Option<PathBuf>,

    /// Archive name prefix
    #[arg(short = 'p', long, global = true, env = "LOGBACKUP_BKP_PREFIX")]
    pub bkp_prefix: Option<String>,

    /// Nominal spacing between backups (e.g. 3600, 6h, 1d)
    #[arg(
        short = 'i',
        long,
        global = true,
        env = "LOGBACKUP_EXPECTED_INTERVAL",
        value_name = "DURATION"
    )]
    pub expected_interval: Option<ConfigDuration>,

    /// Maximum number of backups kept
    #[arg(short, long, global = true, env = "LOGBACKUP_MAX_KEPT", value_name = "N")]
    pub max_kept: Option<usize>,

    /// Age past which backups are always deleted (e.g. 730d, 104w)
    #[arg(
        short,
        long,
        global = true,
        env = "LOGBACKUP_OUTDATED_HORIZON",
        value_name = "DURATION"
    )]
    pub outdated_horizon: Option<ConfigDuration>,

    /// Gzip-compress new archives
    #[arg(short, long, global = true, env = "LOGBACKUP_COMPRESS")]
    pub compress: bool,

    /// How surplus backups are chosen: buckets or decay
    #[arg(
        long,
        global = true,
        env = "LOGBACKUP_STRATEGY",
        value_name = "buckets|decay"
    )]
    pub strategy: Option<RetentionStrategy>,

    /// Config file (JSON or YAML); also read from LOGBACKUP_CONFIG
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not write the run journal
    #[arg(long, global = true)]
    pub no_journal: bool,

    /// Format of diagnostic logs on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "LOGBACKUP_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// More diagnostic output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Override file settings with whatever was given on the command line
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.src_dir {
            settings.src_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.bkp_dir {
            settings.bkp_dir = Some(dir.clone());
        }
        if let Some(prefix) = &self.bkp_prefix {
            settings.bkp_prefix = prefix.clone();
        }
        if let Some(interval) = self.expected_interval {
            settings.expected_interval = interval;
        }
        if let Some(max_kept) = self.max_kept {
            settings.max_kept = max_kept;
        }
        if let Some(horizon) = self.outdated_horizon {
            settings.outdated_horizon = horizon;
        }
        if self.compress {
            settings.compress = true;
        }
        if let Some(strategy) = self.strategy {
            settings.strategy = strategy;
        }
        if self.no_journal {
            settings.journal = false;
        }
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_verbosity(self.verbose, self.quiet)
    }
}
