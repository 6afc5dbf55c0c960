//! End-to-end tests for the logbackup binary.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use tempfile::TempDir;

/// A source directory with one file, an empty backup directory, and an
/// isolated config home so the host's config file is never picked up.
struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("src")).unwrap();
        fs::write(root.path().join("src/data.txt"), "hello").unwrap();
        fs::create_dir_all(root.path().join("config")).unwrap();
        Self { root }
    }

    fn src(&self) -> std::path::PathBuf {
        self.root.path().join("src")
    }

    fn bkp(&self) -> std::path::PathBuf {
        self.root.path().join("bkp")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("logbackup").unwrap();
        cmd.env("XDG_CONFIG_HOME", self.root.path().join("config"))
            .env("HOME", self.root.path())
            .env_remove("LOGBACKUP_CONFIG")
            .env_remove("RUST_LOG")
            .arg("-s")
            .arg(self.src())
            .arg("-b")
            .arg(self.bkp());
        cmd
    }

    /// Seed one empty archive per day, aged 0 to `days - 1` days
    fn seed_daily(&self, days: i64) {
        fs::create_dir_all(self.bkp()).unwrap();
        let now = Utc::now();
        for d in 0..days {
            let ts = now - Duration::days(d);
            let name = format!("backup_{}.tar", ts.format("%Y-%m-%d_%H-%M-%S"));
            fs::write(self.bkp().join(name), "").unwrap();
        }
    }

    fn archives(&self) -> Vec<String> {
        list_archives(&self.bkp())
    }
}

fn list_archives(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("backup_") && n.contains(".tar"))
        .collect();
    names.sort();
    names
}

#[test]
fn run_creates_archive() {
    let fx = Fixture::new();

    fx.cmd()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created: backup_"));

    let archives = fx.archives();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].ends_with(".tar"));

    // The lock is released on exit, so the next run is not blocked.
    fx.cmd().arg("run").assert().success();
}

#[test]
fn no_subcommand_runs() {
    let fx = Fixture::new();

    fx.cmd().arg("-c").assert().success();

    let archives = fx.archives();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].ends_with(".tar.gz"));
}

#[test]
fn run_without_source_fails_before_pruning() {
    let fx = Fixture::new();
    fx.seed_daily(10);
    fs::remove_dir_all(fx.src()).unwrap();

    fx.cmd().arg("run").assert().failure();

    assert_eq!(fx.archives().len(), 10);
}

#[test]
fn plan_shows_buckets_without_deleting() {
    let fx = Fixture::new();
    fx.seed_daily(10);

    fx.cmd()
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bucket"))
        .stdout(predicate::str::contains("delete (redundant)"))
        .stdout(predicate::str::contains("Keep 4, delete 6"));

    assert_eq!(fx.archives().len(), 10);
}

#[test]
fn plan_json_is_parseable() {
    let fx = Fixture::new();
    fx.seed_daily(3);

    let output = fx.cmd().args(["plan", "--json"]).output().unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["kept"].as_array().unwrap().len(), 2);
    assert_eq!(plan["deletions"].as_array().unwrap().len(), 1);
}

#[test]
fn prune_dry_run_keeps_files() {
    let fx = Fixture::new();
    fx.seed_daily(10);

    fx.cmd()
        .args(["prune", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("would delete"));

    assert_eq!(fx.archives().len(), 10);
}

#[test]
fn prune_thins_to_one_per_bucket() {
    let fx = Fixture::new();
    fx.seed_daily(10);

    fx.cmd().arg("prune").assert().success();
    assert_eq!(fx.archives().len(), 4);

    // A second pass has nothing left to do
    fx.cmd().arg("prune").assert().success();
    assert_eq!(fx.archives().len(), 4);
}

#[test]
fn prune_respects_max_kept() {
    let fx = Fixture::new();
    fx.seed_daily(10);

    fx.cmd().args(["-m", "2", "prune"]).assert().success();
    assert_eq!(fx.archives().len(), 2);
}

#[test]
fn zero_max_kept_is_rejected() {
    let fx = Fixture::new();
    fx.seed_daily(5);

    fx.cmd()
        .args(["-m", "0", "prune"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max kept must be greater than zero"));

    assert_eq!(fx.archives().len(), 5);
}

#[test]
fn list_shows_backups_and_ignores_unparsable() {
    let fx = Fixture::new();
    fx.seed_daily(2);
    fs::write(fx.bkp().join("backup_2024-02-30_00-00-00.tar"), "").unwrap();

    fx.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 2 backup(s)"))
        .stdout(predicate::str::contains("backup_2024-02-30_00-00-00.tar"));

    fx.cmd().arg("prune").assert().success();
    assert!(fx.bkp().join("backup_2024-02-30_00-00-00.tar").exists());
}

#[test]
fn list_empty_directory() {
    let fx = Fixture::new();

    fx.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}

#[test]
fn journal_records_runs() {
    let fx = Fixture::new();

    fx.cmd().arg("run").assert().success();

    fx.cmd()
        .arg("journal")
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATED backup_"));
}

#[test]
fn no_journal_flag_skips_journal() {
    let fx = Fixture::new();

    fx.cmd().args(["--no-journal", "run"]).assert().success();
    assert!(!fx.bkp().join("backup.journal.jsonl").exists());
}

#[test]
fn config_file_and_flags_combine() {
    let fx = Fixture::new();
    let config = fx.root.path().join("logbackup.yaml");
    fs::write(&config, "max_kept: 6\nexpected_interval: 12h\n").unwrap();

    fx.cmd()
        .arg("--config")
        .arg(&config)
        .args(["-p", "db", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Max kept:           6"))
        .stdout(predicate::str::contains("Expected interval:  12h"))
        .stdout(predicate::str::contains("Prefix:             db"));
}

#[test]
fn missing_config_file_fails() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["--config", "/nonexistent/logbackup.json", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn long_help_mentions_utc_names() {
    Command::cargo_bin("logbackup")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("UTC timestamps"));
}

#[test]
fn other_prefix_archives_are_left_alone() {
    let fx = Fixture::new();
    fx.seed_daily(1);
    let other = "backup_db_2024-01-01_00-00-00.tar";
    fs::write(fx.bkp().join(other), "").unwrap();

    fx.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 backup(s)"))
        .stdout(predicate::str::contains(other).not());

    assert!(fx.bkp().join(other).exists());
}
