//! Display formatting for terminal output
//!
//! Formats inventories, retention plans and run reports as plain-text
//! tables for the CLI.

pub mod format;
pub mod inventory;
pub mod plan;
pub mod report;

pub use format::{format_age, format_size};
pub use inventory::format_inventory;
pub use plan::format_plan;
pub use report::format_report;
