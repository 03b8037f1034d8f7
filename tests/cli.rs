// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod common;

use assert_cmd::prelude::*;
use common::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn dbdiversity() -> Command {
    let mut cmd = Command::cargo_bin("dbdiversity").unwrap();
    cmd.env_remove("DB_SRC").env_remove("OUTPUT");
    cmd
}

#[test]
fn missing_parent_directory_fails() {
    let dir = tempdir().unwrap();
    dbdiversity()
        .arg(dir.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn prints_both_sections_of_the_table() {
    let dir = tempdir().unwrap();
    two_databases(dir.path());
    dbdiversity()
        .arg(dir.path())
        .args(&["--precision", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Max SI"))
        .stdout(predicate::str::contains("Fill rate"))
        .stdout(predicate::str::contains("Relative range"))
        .stdout(predicate::str::contains("db2"));
}

#[test]
fn skipped_databases_are_reported_on_stderr() {
    let dir = tempdir().unwrap();
    two_databases(dir.path());
    collinear_database(dir.path());
    dbdiversity()
        .arg(dir.path())
        .args(&["--precision", "50", "--keep-going"])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipped: database flat"));
}

#[test]
fn output_directory_gets_results() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let out = dir.path().join("out");
    two_databases(&data);
    dbdiversity()
        .arg(&data)
        .arg("--output")
        .arg(&out)
        .args(&["--precision", "50"])
        .assert()
        .success();
    assert!(out.join("results.json").is_file());
    assert!(out.join("db1_convex_hull.png").is_file());
}

#[test]
fn configuration_file_is_read() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    two_databases(&data);
    collinear_database(&data);
    let config = dir.path().join("diversity.yaml");
    fs::write(&config, "fill_rate:\n  precision: 50\npolicy:\n  geometry: skip\n").unwrap();
    dbdiversity()
        .arg(&data)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("hull geometry"));
}

#[test]
fn bad_numbers_are_rejected() {
    let dir = tempdir().unwrap();
    two_databases(dir.path());
    dbdiversity()
        .arg(dir.path())
        .args(&["--radius", "wide"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--radius expects a number"));
}

#[test]
fn settings_are_checked_after_overrides() {
    let dir = tempdir().unwrap();
    two_databases(dir.path());
    dbdiversity()
        .arg(dir.path())
        .arg("--radius=-5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));
}
