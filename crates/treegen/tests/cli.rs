// crates/treegen/tests/cli.rs
// ============================================================================
// Module: CLI Tests
// Description: Runs the treegen binary against temporary workspaces.
// Purpose: Verify flag overrides, summaries, and exit codes.
// Dependencies: treegen, tempfile
// ============================================================================

//! ## Overview
//! Black-box tests of `treegen export`, `check`, and `rules`.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::fs;
use std::path::Path;
use std::process::Command;
use std::process::Output;

use crate::common::humidity_stump;
use crate::common::write_artifact;

fn treegen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_treegen")).current_dir(dir).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn export_applies_flag_overrides() {
    let dir = tempfile::tempdir().unwrap();
    write_artifact(dir.path(), "tree.json", &humidity_stump());
    fs::write(dir.path().join("treegen.toml"), "[audit]\nenabled = false\n").unwrap();

    let output = treegen(
        dir.path(),
        &["export", "--model", "tree.json", "--out-dir", "build", "--profile", "flat_array"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let summary = stdout(&output);
    assert!(summary.contains("flat_array: 3 nodes, 2 leaves, depth 1"), "{summary}");

    let implementation = fs::read_to_string(dir.path().join("build/rain_model.c")).unwrap();
    assert!(implementation.contains("int predict_rain(const float features[3]) {"));

    let check = treegen(
        dir.path(),
        &["check", "--model", "tree.json", "--out-dir", "build", "--profile", "flat_array"],
    );
    assert!(check.status.success(), "stderr: {}", stderr(&check));
    assert!(stdout(&check).starts_with("up to date: "));
}

#[test]
fn base_indent_flag_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    write_artifact(dir.path(), "model.json", &humidity_stump());
    let output = treegen(dir.path(), &["export", "--base-indent", "40"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("treegen config failed"));
    assert!(!dir.path().join("src").exists());
}

#[test]
fn failures_name_the_stage_and_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("treegen.toml"), "[audit]\nenabled = false\n").unwrap();
    let output = treegen(dir.path(), &["export"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("treegen artifact_load failed"));
}

#[test]
fn rules_print_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_artifact(dir.path(), "model.json", &humidity_stump());
    fs::write(dir.path().join("treegen.toml"), "[audit]\nenabled = false\n").unwrap();
    let output = treegen(dir.path(), &["rules"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "|--- Humidity <= 65.00\n|   |--- class: 0\n|--- Humidity >  65.00\n|   |--- class: 1\n"
    );
}
