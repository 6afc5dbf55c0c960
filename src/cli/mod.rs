//! CLI argument parsing and command handlers
//!
//! Bridges clap parsing with the backup cycle.

pub mod args;
pub mod commands;

pub use args::GlobalArgs;
pub use commands::{handle_command, Commands};
