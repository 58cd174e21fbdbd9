//! End-to-end tests for the `classpkg completions` command.

mod common;
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("classpkg");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("powershell"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("classpkg");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_classpkg()"))
        .stdout(predicate::str::contains("force-remove-class"))
        .stdout(predicate::str::contains("update-modified"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("classpkg");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef classpkg"));
}

#[test]
fn test_completions_ignore_missing_config() {
    // completions never read the configuration
    let mut cmd = cargo_bin_cmd!("classpkg");
    cmd.env("CLASSPKG_CONFIG", "/nonexistent/config.yaml")
        .arg("completions")
        .arg("fish")
        .assert()
        .success();
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let mut cmd = cargo_bin_cmd!("classpkg");
    cmd.arg("frobnicate").assert().code(2);
}
