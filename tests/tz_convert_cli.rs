use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("tz_convert").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn converts_utc_to_pst() {
    cmd()
        .args(["12:00", "UTC", "PST", "--date", "2025-01-15"])
        .assert()
        .success()
        .stdout(contains("12:00 UTC is 04:00 PST"));
}

#[test]
fn converts_between_full_identifiers() {
    cmd()
        .args(["23:15", "Asia/Tokyo", "Europe/Berlin", "--date", "2025-01-15"])
        .assert()
        .success()
        .stdout(contains("is 15:15 Europe/Berlin"));
}

#[test]
fn invalid_time_format_exits_non_zero() {
    cmd()
        .args(["7pm", "UTC", "PST"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid time format"));
}

#[test]
fn hyphen_leading_time_is_a_format_error() {
    cmd()
        .args(["-1:00", "UTC", "PST"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid time format"));
}

#[test]
fn unknown_timezone_exits_non_zero() {
    cmd()
        .args(["12:00", "UTC", "Atlantis/Lost"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Unknown timezone 'Atlantis/Lost'"));
}

#[test]
fn missing_arguments_print_usage() {
    cmd()
        .args(["12:00", "UTC"])
        .assert()
        .failure()
        .stderr(contains("Usage"));
}

#[test]
fn extra_arguments_print_usage() {
    cmd()
        .args(["12:00", "UTC", "PST", "EST"])
        .assert()
        .failure()
        .stderr(contains("Usage"));
}
