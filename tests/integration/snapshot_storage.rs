use predicates::prelude::*;
use regex::Regex;

use super::common::{BIN, report_cmd, run_json};

#[test]
fn saved_snapshot_answers_later_queries_without_input() {
  let data = test_support::tempdir();

  let live = run_json(report_cmd().arg("--save").arg("--data-dir").arg(data.path()).args(["--report", "hours"]));

  let files: Vec<String> = std::fs::read_dir(data.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
    .collect();
  // the stamp is the override instant in local time
  let name = Regex::new(r"^ABC_stats_2025081[456]_\d{6}\.json$").unwrap();
  assert_eq!(files.len(), 1);
  assert!(name.is_match(&files[0]), "unexpected snapshot name {}", files[0]);

  let mut reload = test_support::cmd_bin(BIN);
  reload
    .args(["--project", "ABC", "--from-snapshot", "--report", "hours"])
    .arg("--data-dir")
    .arg(data.path());
  assert_eq!(run_json(&mut reload), live);
}

#[test]
fn keep_limits_saved_snapshots() {
  let data = test_support::tempdir();
  for stamp in ["20250801_090000", "20250802_090000", "20250803_090000"] {
    std::fs::write(data.path().join(format!("ABC_stats_{stamp}.json")), "{}").unwrap();
  }

  report_cmd()
    .arg("--save")
    .arg("--data-dir")
    .arg(data.path())
    .args(["--keep", "2"])
    .assert()
    .success();

  let mut names: Vec<String> = std::fs::read_dir(data.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
    .collect();
  names.sort();
  assert_eq!(names.len(), 2);
  assert_eq!(names[0], "ABC_stats_20250803_090000.json");
  assert!(names[1].starts_with("ABC_stats_202508"));
}

#[test]
fn from_snapshot_without_saved_data_fails() {
  let data = test_support::tempdir();
  test_support::cmd_bin(BIN)
    .args(["--project", "ABC", "--from-snapshot"])
    .arg("--data-dir")
    .arg(data.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("no saved snapshot for project ABC"));
}

#[test]
fn snapshot_reload_warns_when_weeks_differ() {
  let data = test_support::tempdir();
  report_cmd().arg("--save").arg("--data-dir").arg(data.path()).assert().success();

  // saved with two weeks; the default asks for four
  test_support::cmd_bin(BIN)
    .args(["--project", "ABC", "--from-snapshot", "--report", "counts"])
    .arg("--data-dir")
    .arg(data.path())
    .assert()
    .success()
    .stderr(predicate::str::contains("snapshot covers a different number of weeks"));

  test_support::cmd_bin(BIN)
    .args(["--project", "ABC", "--from-snapshot", "--weeks", "2", "--report", "counts"])
    .arg("--data-dir")
    .arg(data.path())
    .assert()
    .success()
    .stderr(predicate::str::contains("different number of weeks").not());
}
