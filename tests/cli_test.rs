//! End-to-end tests of the `argspec` binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn argspec() -> Command {
    let mut cmd = Command::cargo_bin("argspec").expect("binary built");
    cmd.env_remove("ARGSPEC_LOG").env_remove("ARGSPEC_COLOR");
    cmd
}

#[test]
fn given_no_arguments_when_running_then_usage_error() {
    argspec()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn given_help_when_running_then_lists_commands() {
    argspec()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("hash-file")
                .and(predicate::str::contains("list-files"))
                .and(predicate::str::contains("sum"))
                .and(predicate::str::contains("--debug")),
        );
}

#[test]
fn given_list_files_help_when_running_then_shows_negative_flag() {
    argspec()
        .args(["list-files", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--no-recursive")
                .and(predicate::str::contains("-p, --pattern <REGEX>"))
                .and(predicate::str::contains("Only list the top level of DIR")),
        );
}

#[test]
fn given_numbers_when_summing_then_prints_total() {
    argspec()
        .args(["sum", "1", "2.5", "3"])
        .assert()
        .success()
        .stdout("6.5\n");
}

#[test]
fn given_status_flag_when_summing_then_total_is_exit_code() {
    argspec().args(["sum", "--status", "2", "3"]).assert().code(5);
}

#[test]
fn given_bad_number_when_summing_then_usage_error() {
    argspec()
        .args(["sum", "1", "two"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid numbers:"));
}

#[test]
fn given_file_when_hashing_then_prints_sha256() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("hello.txt");
    fs::write(&file, "hello").unwrap();

    argspec()
        .arg("hash-file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
        ));
}

#[test]
fn given_wrong_expected_digest_when_hashing_then_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("hello.txt");
    fs::write(&file, "hello").unwrap();

    argspec()
        .arg("hash-file")
        .arg(&file)
        .args(["--expected", "deadbeef"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("digest mismatch"));
}

#[test]
fn given_unknown_algorithm_when_hashing_then_usage_error() {
    argspec()
        .args(["hash-file", "x", "-a", "md5"])
        .assert()
        .code(2);
}

#[test]
fn given_missing_file_when_hashing_then_error_report() {
    argspec()
        .args(["hash-file", "/nonexistent/argspec-test"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("IoError: cannot read"));
}

#[test]
fn given_tree_when_listing_then_filters_and_honours_depth() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.rs"), "").unwrap();
    fs::write(dir.path().join("b.txt"), "").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("c.rs"), "").unwrap();

    argspec()
        .arg("list-files")
        .arg(dir.path())
        .args(["-p", r"\.rs$"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.rs").and(predicate::str::contains("c.rs")));

    argspec()
        .arg("list-files")
        .arg(dir.path())
        .args(["--pattern", r"\.rs$", "--no-recursive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.rs").and(predicate::str::contains("c.rs").not()));
}

#[test]
fn given_no_match_when_listing_then_fails() {
    let dir = TempDir::new().unwrap();
    argspec()
        .arg("list-files")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout("");
}

#[test]
fn given_invalid_regex_when_listing_then_usage_error() {
    argspec()
        .args(["list-files", "--pattern", "("])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid argument to --pattern"));
}

#[test]
fn given_completion_when_running_then_prints_script() {
    argspec()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("argspec"));
}

#[test]
fn given_bad_color_setting_when_running_then_fails_before_parsing() {
    argspec()
        .env("ARGSPEC_COLOR", "sometimes")
        .args(["sum", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("settings error"));
}
