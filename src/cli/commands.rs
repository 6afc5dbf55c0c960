//! Subcommands and their handlers

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;

use crate::backup::BackupCycle;
use crate::config::{ConfigSource, Settings};
use crate::display::{format_inventory, format_plan, format_report};
use crate::error::BackupResult;
use crate::journal::Journal;

/// logbackup subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Archive the source directory, then prune old backups (default)
    Run,

    /// Prune old backups without creating a new one
    Prune {
        /// Show what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the age bucket of every backup and what pruning would do
    Plan {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List backups in the backup directory
    #[command(alias = "ls")]
    List,

    /// Show what recent runs did
    Journal {
        /// Number of runs to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to this file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
}

/// Handle a command with fully resolved settings
pub fn handle_command(
    settings: &Settings,
    source: &ConfigSource,
    cmd: Commands,
) -> BackupResult<()> {
    let now = Utc::now();

    match cmd {
        Commands::Run => {
            let cycle = BackupCycle::from_settings(settings)?;
            let report = cycle.run(now)?;
            print!("{}", format_report(&report));
        }

        Commands::Prune { dry_run } => {
            let cycle = BackupCycle::from_settings(settings)?;
            let report = cycle.prune(now, dry_run)?;
            if dry_run {
                println!("Dry run: nothing was deleted.");
            }
            print!("{}", format_report(&report));
        }

        Commands::Plan { json } => {
            let cycle = BackupCycle::from_settings(settings)?;
            let (inventory, plan) = cycle.plan(now)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }

            println!(
                "Retention plan for {} ({})",
                cycle.bkp_dir().display(),
                cycle.policy().strategy()
            );
            println!();
            println!("{}", format_plan(&plan, cycle.policy()));
            for rejected in &inventory.rejected {
                println!("  ignored {} ({})", rejected.name, rejected.reason);
            }
        }

        Commands::List => {
            let cycle = BackupCycle::from_settings(settings)?;
            let inventory = cycle.inventory()?;
            println!("{}", format_inventory(&inventory, now));
        }

        Commands::Journal { limit } => {
            let naming = settings.naming()?;
            let journal = Journal::new(settings.require_bkp_dir()?.join(naming.journal_file_name()));

            if !journal.exists() {
                println!("No journal found at {}", journal.path().display());
                return Ok(());
            }

            let runs = journal.recent_runs(limit)?;
            if runs.is_empty() {
                println!("Journal is empty.");
                return Ok(());
            }
            for run in &runs {
                println!(
                    "Run at {}: {}",
                    run.started.format("%Y-%m-%d %H:%M:%S UTC"),
                    run.summary()
                );
                for entry in &run.entries {
                    println!("  {}", entry.format_human_readable());
                }
            }
        }

        Commands::Config { save } => {
            if let Some(path) = save {
                settings.save(&path)?;
                println!("Configuration saved to {}", path.display());
                return Ok(());
            }

            println!("logbackup Configuration");
            println!("=======================");
            match source.path() {
                Some(path) => println!("Config file:        {}", path.display()),
                None => println!("Config file:        (none, built-in defaults)"),
            }
            println!("Source directory:   {}", display_opt(settings.src_dir.as_ref()));
            println!("Backup directory:   {}", display_opt(settings.bkp_dir.as_ref()));
            println!("Prefix:             {}", settings.bkp_prefix);
            println!("Expected interval:  {}", settings.expected_interval);
            println!("Max kept:           {}", settings.max_kept);
            println!("Outdated horizon:   {}", settings.outdated_horizon);
            println!("Compress:           {}", settings.compress);
            println!("Strategy:           {}", settings.strategy);
            println!("Journal:            {}", settings.journal);

            if let Err(err) = settings.validate() {
                println!();
                println!("Warning: {}", err);
            }
        }
    }

    Ok(())
}

fn display_opt(path: Option<&PathBuf>) -> String {
    path.map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
}
