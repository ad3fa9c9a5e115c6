use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_flags() {
    cargo_bin_cmd!("slk")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--ls-users"))
        .stdout(predicate::str::contains("--ls-channels"))
        .stdout(predicate::str::contains("--ch-cat"))
        .stdout(predicate::str::contains("--log-file"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("slk")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("slk"));
}

#[test]
fn test_list_modes_conflict() {
    cargo_bin_cmd!("slk")
        .args(["--ls-users", "--ls-channels"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
