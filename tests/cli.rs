//! Exit codes and prompts of the `translate` binary.
//!
//! Every run happens in a temp directory with the model settings scrubbed
//! from the environment, so no test reaches a model endpoint.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SETTINGS: [&str; 4] = ["API_KEY", "MODEL_NAME", "MODEL_BASE_URL", "TRANSLATE_CONFIG"];

/// `translate` run from `dir` with no inherited model settings.
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_translate"));
    cmd.current_dir(dir).env("RUST_LOG", "error");
    for key in SETTINGS {
        cmd.env_remove(key);
    }
    cmd
}

/// Same, with a complete (unreachable) endpoint configured.
fn configured(dir: &Path) -> Command {
    let mut cmd = cli(dir);
    cmd.env("API_KEY", "sk-cli-test-0123456789")
        .env("MODEL_NAME", "test-model")
        .env("MODEL_BASE_URL", "http://127.0.0.1:9/v1");
    cmd
}

/// A notebook with a single raw cell: translating it needs no model call.
fn raw_notebook(dir: &Path) -> PathBuf {
    let nb = json!({
        "cells": [{"cell_type": "raw", "metadata": {}, "source": "as is"}],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5
    });
    let path = dir.join("nb.ipynb");
    fs::write(&path, serde_json::to_string(&nb).unwrap()).unwrap();
    path
}

// ── Usage errors exit 1 ──────────────────────────────────────────────────────

#[test]
fn no_arguments_exits_1() {
    let dir = TempDir::new().unwrap();
    cli(dir.path()).assert().code(1);
}

#[test]
fn missing_input_exits_1() {
    let dir = TempDir::new().unwrap();
    configured(dir.path())
        .args(["-t", "Spanish"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("INPUT"));
}

#[test]
fn unknown_flag_exits_1() {
    let dir = TempDir::new().unwrap();
    cli(dir.path()).args(["--bogus", "x.ipynb"]).assert().code(1);
}

#[test]
fn nonexistent_notebook_exits_1() {
    let dir = TempDir::new().unwrap();
    configured(dir.path())
        .arg("nope.ipynb")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn non_notebook_extension_exits_1() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "hi").unwrap();
    configured(dir.path())
        .arg("notes.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".ipynb"));
}

#[test]
fn incomplete_settings_exit_1_and_name_every_key() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .arg("--check-config")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("API_KEY, MODEL_NAME, MODEL_BASE_URL"));
}

// ── Informational flags exit 0 ───────────────────────────────────────────────

#[test]
fn version_flag_prints_version() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_flag_succeeds() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--target-language"));
}

#[test]
fn check_config_masks_the_key() {
    let dir = TempDir::new().unwrap();
    configured(dir.path())
        .arg("-c")
        .assert()
        .success()
        .stdout(predicate::str::contains("0123456789"))
        .stdout(predicate::str::contains("sk-cli").not());
}

#[test]
fn dotenv_file_supplies_settings() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".env"),
        "API_KEY=sk-from-dotenv-file\nMODEL_NAME=dotenv-model\nMODEL_BASE_URL=http://127.0.0.1:9/v1\n",
    )
    .unwrap();
    cli(dir.path())
        .arg("--check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("dotenv-model"));
}

// ── Overwrite prompt ─────────────────────────────────────────────────────────

#[test]
fn declined_overwrite_keeps_existing_output() {
    let dir = TempDir::new().unwrap();
    raw_notebook(dir.path());
    let existing = dir.path().join("nb_translated.ipynb");
    fs::write(&existing, "old").unwrap();

    configured(dir.path())
        .args(["nb.ipynb", "-q"])
        .write_stdin("n\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Translation cancelled"));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "old");
}

#[test]
fn accepted_overwrite_replaces_output() {
    let dir = TempDir::new().unwrap();
    raw_notebook(dir.path());
    let existing = dir.path().join("nb_translated.ipynb");
    fs::write(&existing, "old").unwrap();

    configured(dir.path())
        .args(["nb.ipynb", "-q"])
        .write_stdin("YES\n")
        .assert()
        .success();
    let written = fs::read_to_string(&existing).unwrap();
    assert!(written.contains("as is"), "got: {written}");
}

#[test]
fn yes_flag_skips_the_prompt() {
    let dir = TempDir::new().unwrap();
    raw_notebook(dir.path());
    fs::write(dir.path().join("nb_translated.ipynb"), "old").unwrap();

    configured(dir.path())
        .args(["nb.ipynb", "--yes", "-q"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Overwrite?").not());
}
