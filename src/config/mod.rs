//! Configuration module for logbackup
//!
//! This module provides configuration management including:
//! - Config file resolution (flag, environment, platform default)
//! - Settings loading and persistence (JSON or YAML)
//! - Duration parsing for interval and horizon values

pub mod duration;
pub mod paths;
pub mod settings;

pub use duration::{format_duration, parse_duration, ConfigDuration};
pub use paths::ConfigSource;
pub use settings::Settings;
