//! CLI surface tests against an isolated `$HOME`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn slate_remote(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("slate-remote").expect("binary");
    cmd.env("HOME", home.path());
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().expect("home");
    slate_remote(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("notify"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn status_reports_not_running_without_endpoint() {
    let home = TempDir::new().expect("home");
    slate_remote(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not running"));
}

#[test]
fn sync_without_endpoint_is_friendly() {
    let home = TempDir::new().expect("home");
    slate_remote(&home)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("not running"));
}

#[test]
fn notify_requires_a_message() {
    let home = TempDir::new().expect("home");
    slate_remote(&home).arg("notify").assert().failure();
}

#[test]
fn notify_without_endpoint_is_friendly() {
    let home = TempDir::new().expect("home");
    slate_remote(&home)
        .args(["notify", "hello", "--title", "T"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not running"));
}

#[test]
fn custom_identity_changes_the_socket_path() {
    let home = TempDir::new().expect("home");
    slate_remote(&home)
        .args(["--identity", "slate.alt", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slate.alt.sock"));
}
