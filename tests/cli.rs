use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn valid_page_json() -> &'static str {
    r#"
{
  "version": 1,
  "title": "Bookings",
  "viewport": { "width": 1024, "height": 768 },
  "elements": [
    {
      "id": "check-in",
      "label": "Check-in",
      "markers": ["data-date-picker"],
      "attributes": { "data-date-format": "dd-mm-yyyy" },
      "rect": { "left": 40, "top": 100, "width": 240, "height": 36 }
    },
    {
      "id": "stay",
      "markers": ["data-date-range"],
      "rect": { "left": 40, "top": 180, "width": 240, "height": 36 }
    },
    {
      "id": "arrival-time",
      "markers": ["data-time-picker"],
      "attributes": { "data-time-step": "30" },
      "rect": { "left": 40, "top": 260, "width": 240, "height": 36 }
    }
  ]
}
"#
}

#[test]
fn diagnostics_succeeds_with_demo_page() {
    let mut cmd = cargo_bin_cmd!("dashpick");
    cmd.arg("--diagnostics")
        .arg("--today")
        .arg("2025-03-15T09:30")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pickers: 5"))
        .stdout(predicate::str::contains("Time source: PINNED"));
}

#[test]
fn diagnostics_succeeds_with_valid_page_file() {
    let dir = tempdir().expect("tempdir");
    let page = dir.path().join("page.json");
    fs::write(&page, valid_page_json()).expect("write json");

    let mut cmd = cargo_bin_cmd!("dashpick");
    cmd.arg("--diagnostics")
        .arg("--page")
        .arg(page)
        .assert()
        .success()
        .stdout(predicate::str::contains("Page: Bookings (3 elements)"))
        .stdout(predicate::str::contains("Pickers: 3"))
        .stdout(predicate::str::contains("step 30 min"));
}

#[test]
fn malformed_json_fails_with_clear_error() {
    let dir = tempdir().expect("tempdir");
    let page = dir.path().join("page.json");
    fs::write(&page, "{ not-valid-json ").expect("write invalid json");

    let mut cmd = cargo_bin_cmd!("dashpick");
    cmd.arg("--diagnostics")
        .arg("--page")
        .arg(page)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn unsupported_version_fails() {
    let dir = tempdir().expect("tempdir");
    let page = dir.path().join("page.json");
    fs::write(&page, r#"{ "version": 2, "elements": [] }"#).expect("write json");

    let mut cmd = cargo_bin_cmd!("dashpick");
    cmd.arg("--diagnostics")
        .arg("--page")
        .arg(page)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported page version 2"));
}

#[test]
fn month_flag_prints_leap_february() {
    let mut cmd = cargo_bin_cmd!("dashpick");
    cmd.arg("--diagnostics")
        .arg("--today")
        .arg("2024-02-14")
        .arg("--month")
        .arg("2024-02")
        .assert()
        .success()
        .stdout(predicate::str::contains("Calendar: February 2024"))
        .stdout(predicate::str::contains("29"))
        .stdout(predicate::str::contains("[14]"));
}

#[test]
fn invalid_month_is_rejected() {
    let mut cmd = cargo_bin_cmd!("dashpick");
    cmd.arg("--diagnostics")
        .arg("--month")
        .arg("2024-13")
        .assert()
        .failure()
        .stderr(predicate::str::contains("month must be between 01 and 12"));
}

#[test]
fn elements_without_id_are_skipped() {
    let dir = tempdir().expect("tempdir");
    let page = dir.path().join("page.json");
    fs::write(
        &page,
        r#"
{
  "version": 1,
  "elements": [
    { "id": "due", "markers": ["data-date-picker"] },
    { "label": "Orphan", "markers": ["data-time-picker"] }
  ]
}
"#,
    )
    .expect("write json");

    let mut cmd = cargo_bin_cmd!("dashpick");
    cmd.arg("--diagnostics")
        .arg("--page")
        .arg(page)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pickers: 1"))
        .stdout(predicate::str::contains("Skipped 1 element"));
}

#[test]
fn invalid_today_fails() {
    let mut cmd = cargo_bin_cmd!("dashpick");
    cmd.arg("--diagnostics")
        .arg("--today")
        .arg("next tuesday")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid datetime"));
}
