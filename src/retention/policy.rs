//! Retention policy parameters
//!
//! The three numbers that drive a retention pass, validated once up front
//! so the engine never has to second-guess them.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{BackupError, BackupResult};

/// How surplus backups are chosen once the outdated horizon is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetentionStrategy {
    /// One survivor per logarithmic age bucket, then the max-kept cap
    #[default]
    Buckets,
    /// Only thin when over the cap, removing the backup whose absence best
    /// fits an exponentially decaying ideal schedule
    Decay,
}

impl fmt::Display for RetentionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionStrategy::Buckets => write!(f, "buckets"),
            RetentionStrategy::Decay => write!(f, "decay"),
        }
    }
}

impl FromStr for RetentionStrategy {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buckets" | "bucket" => Ok(RetentionStrategy::Buckets),
            "decay" => Ok(RetentionStrategy::Decay),
            other => Err(BackupError::Config(format!(
                "unknown retention strategy '{}' (expected 'buckets' or 'decay')",
                other
            ))),
        }
    }
}

/// Validated policy for one retention pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    expected_interval: Duration,
    max_kept: usize,
    outdated_horizon: Duration,
    strategy: RetentionStrategy,
}

impl RetentionPolicy {
    /// Default spacing between backups
    pub const DEFAULT_INTERVAL_SECS: i64 = 86_400;
    /// Default maximum number of surviving backups
    pub const DEFAULT_MAX_KEPT: usize = 14;
    /// Default outdated horizon
    pub const DEFAULT_HORIZON_SECS: i64 = 730 * 86_400;

    /// Build a policy, rejecting non-positive parameters
    ///
    /// `expected_interval` must be at least one second since bucket indices
    /// are computed in whole seconds.
    pub fn new(
        expected_interval: Duration,
        max_kept: usize,
        outdated_horizon: Duration,
    ) -> BackupResult<Self> {
        if expected_interval < Duration::seconds(1) {
            return Err(BackupError::Config(format!(
                "expected interval must be at least one second, got {}s",
                expected_interval.num_seconds()
            )));
        }
        if max_kept == 0 {
            return Err(BackupError::Config(
                "max kept must be greater than zero".into(),
            ));
        }
        if outdated_horizon <= Duration::zero() {
            return Err(BackupError::Config(format!(
                "outdated horizon must be positive, got {}s",
                outdated_horizon.num_seconds()
            )));
        }

        Ok(Self {
            expected_interval,
            max_kept,
            outdated_horizon,
            strategy: RetentionStrategy::default(),
        })
    }

    /// Same policy with a different selection strategy
    pub fn with_strategy(mut self, strategy: RetentionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn expected_interval(&self) -> Duration {
        self.expected_interval
    }

    /// Scale unit in whole seconds (always >= 1)
    pub fn interval_secs(&self) -> u64 {
        self.expected_interval.num_seconds().max(1) as u64
    }

    pub fn max_kept(&self) -> usize {
        self.max_kept
    }

    pub fn outdated_horizon(&self) -> Duration {
        self.outdated_horizon
    }

    pub fn strategy(&self) -> RetentionStrategy {
        self.strategy
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            expected_interval: Duration::seconds(Self::DEFAULT_INTERVAL_SECS),
            max_kept: Self::DEFAULT_MAX_KEPT,
            outdated_horizon: Duration::seconds(Self::DEFAULT_HORIZON_SECS),
            strategy: RetentionStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.expected_interval(), Duration::days(1));
        assert_eq!(policy.max_kept(), 14);
        assert_eq!(policy.outdated_horizon(), Duration::days(730));
        assert_eq!(policy.strategy(), RetentionStrategy::Buckets);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = RetentionPolicy::new(Duration::zero(), 14, Duration::days(1)).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_sub_second_interval() {
        assert!(RetentionPolicy::new(Duration::milliseconds(500), 14, Duration::days(1)).is_err());
    }

    #[test]
    fn test_rejects_zero_max_kept() {
        assert!(RetentionPolicy::new(Duration::days(1), 0, Duration::days(1)).is_err());
    }

    #[test]
    fn test_rejects_non_positive_horizon() {
        assert!(RetentionPolicy::new(Duration::days(1), 3, Duration::zero()).is_err());
        assert!(RetentionPolicy::new(Duration::days(1), 3, Duration::days(-1)).is_err());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "Decay".parse::<RetentionStrategy>().unwrap(),
            RetentionStrategy::Decay
        );
        assert_eq!(
            "buckets".parse::<RetentionStrategy>().unwrap(),
            RetentionStrategy::Buckets
        );
        assert!("weekly".parse::<RetentionStrategy>().is_err());
    }
}
