use predicates::prelude::*;

use super::common::{WEEK_1, WEEK_2, report_cmd, report_cmd_weeks, run_json};

#[test]
fn weekly_report_buckets_logs_by_date_and_falls_back_to_estimates() {
  let v = run_json(&mut report_cmd());
  let weeks = v.as_array().expect("array of weeks");
  assert_eq!(weeks.len(), 2);

  let w1 = &weeks[0];
  assert_eq!(w1["label"], WEEK_1);
  assert_eq!(w1["issue_count"], 2);
  // ABC-3 (4h) plus Alice's entry on ABC-2, which is dated inside week 1
  assert_eq!(w1["logged_hours"]["Alice Smith"], 6.0);
  assert_eq!(w1["estimated_fallback_hours"]["Alice Smith"], 8.0);
  assert_eq!(w1["total_hours"]["Alice Smith"], 14.0);
  assert_eq!(w1["issues_without_log"][0]["key"], "ABC-1");
  assert!(w1["worklogs_by_issue"]["ABC-2"].is_array());

  let w2 = &weeks[1];
  assert_eq!(w2["label"], WEEK_2);
  assert_eq!(w2["issue_count"], 1);
  // the July entry on ABC-2 is outside every window
  assert_eq!(w2["logged_hours"]["Bob Jones"], 3.0);
  assert_eq!(w2["worklogs_by_issue"]["ABC-2"].as_array().unwrap().len(), 1);
}

#[test]
fn hours_report_orders_authors_by_total() {
  let v = run_json(report_cmd().args(["--report", "hours"]));
  assert_eq!(v["columns"], serde_json::json!([WEEK_1, WEEK_2]));
  assert_eq!(v["rows"][0]["author"], "Alice Smith");
  assert_eq!(v["rows"][0]["hours"], serde_json::json!([14.0, 0.0]));
  assert_eq!(v["rows"][1]["author"], "Bob Jones");
  assert_eq!(v["column_totals"], serde_json::json!([14.0, 3.0]));
  assert_eq!(v["grand_total"], 17.0);
}

#[test]
fn no_log_and_counts_reports() {
  let no_log = run_json(report_cmd().args(["--report", "no-log"]));
  let keys: Vec<&str> = no_log.as_array().unwrap().iter().map(|t| t["key"].as_str().unwrap()).collect();
  assert_eq!(keys, vec!["ABC-1"]);
  assert_eq!(no_log[0]["assignee"], "Alice Smith");
  assert_eq!(no_log[0]["window"], WEEK_1);

  let counts = run_json(report_cmd().args(["--report", "counts"]));
  assert_eq!(
    counts,
    serde_json::json!([
      { "label": WEEK_1, "issue_count": 2 },
      { "label": WEEK_2, "issue_count": 1 }
    ])
  );
}

#[test]
fn user_tasks_report_is_heaviest_first() {
  let v = run_json(report_cmd().args(["--report", "user-tasks", "--author", "Alice Smith"]));
  let keys: Vec<&str> = v.as_array().unwrap().iter().map(|t| t["key"].as_str().unwrap()).collect();
  assert_eq!(keys, vec!["ABC-1", "ABC-3", "ABC-2"]);
  assert_eq!(v[0]["estimated"], true);
  assert_eq!(v[0]["hours"], 8.0);
  assert_eq!(v[2]["hours"], 2.0);
}

#[test]
fn daily_report_defaults_to_latest_week() {
  let v = run_json(report_cmd().args(["--report", "daily", "--author", "Alice Smith"]));
  assert_eq!(v["window"], WEEK_1);
  assert_eq!(v["days"][0]["weekday"], "Monday");
  assert_eq!(v["days"][0]["hours"], 4.0);
  // XYZ-1 and the unfinished ABC-5 still count for the author
  assert_eq!(v["days"][1]["hours"], 1.0);
  assert_eq!(v["days"][2]["date"], "2025-08-13");
  assert_eq!(v["days"][2]["hours"], 2.0);
  assert_eq!(v["days"][3]["hours"], 1.5);
  assert_eq!(v["days"][6]["hours"], 0.0);
  assert_eq!(v["total_hours"], 8.5);
  assert_eq!(v["tasks_count"], 4);
  let keys: Vec<&str> = v["worklogs"].as_array().unwrap().iter().map(|w| w["issue_key"].as_str().unwrap()).collect();
  assert_eq!(keys, vec!["ABC-3", "XYZ-1", "ABC-2", "ABC-5"]);
}

#[test]
fn daily_report_accepts_the_author_login() {
  let v = run_json(report_cmd().args(["--report", "daily", "--author", "alice", "--week", WEEK_2]));
  assert_eq!(v["window"], WEEK_2);
  assert_eq!(v["total_hours"], 0.0);
  assert_eq!(v["tasks_count"], 0);

  let v = run_json(report_cmd().args(["--report", "daily", "--author", "alice"]));
  assert_eq!(v["total_hours"], 8.5);
}

#[test]
fn daily_report_rejects_unknown_week() {
  report_cmd()
    .args(["--report", "daily", "--author", "Alice Smith", "--week", "Week 9: nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown window"));
}

#[test]
fn done_no_log_lists_finished_issues_nobody_logged() {
  let v = run_json(report_cmd().args(["--report", "done-no-log"]));
  let keys: Vec<&str> = v.as_array().unwrap().iter().map(|t| t["key"].as_str().unwrap()).collect();
  // ABC-4 finished before every window; ABC-3 has a log; XYZ-1 is another project
  assert_eq!(keys, vec!["ABC-1", "ABC-4"]);
  assert_eq!(v[0]["assignee"], "Alice Smith");
  assert_eq!(v[0]["created"], "2025-08-01");
  assert_eq!(v[1]["created"], serde_json::Value::Null);

  let v = run_json(report_cmd().args(["--report", "done-no-log", "--user", "bob"]));
  assert_eq!(v, serde_json::json!([{
    "key": "ABC-4",
    "summary": "Old task",
    "assignee": "Bob Jones",
    "status": "Done",
    "created": null,
    "updated": null
  }]));
}

#[test]
fn from_snapshot_refuses_a_user_filter() {
  let td = test_support::tempdir();
  test_support::cmd_bin(super::common::BIN)
    .args(["--project", "ABC", "--from-snapshot", "--user", "alice", "--data-dir"])
    .arg(td.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be combined with --from-snapshot"));
}

#[test]
fn user_filter_restricts_issues_to_assignee() {
  let v = run_json(report_cmd().args(["--user", "alice", "--report", "counts"]));
  assert_eq!(v[0]["issue_count"], 1);
  assert_eq!(v[1]["issue_count"], 0);
}

#[test]
fn as_of_moves_the_windows() {
  let v = run_json(report_cmd_weeks("1").args(["--as-of", "2025-08-06", "--report", "counts"]));
  assert_eq!(v, serde_json::json!([{ "label": "Week 1: 2025-08-04 - 2025-08-10", "issue_count": 1 }]));
}

#[test]
fn natural_language_as_of_is_relative_to_now() {
  let v = run_json(report_cmd_weeks("1").args(["--as-of", "1 week ago", "--report", "counts"]));
  assert_eq!(v[0]["label"], "Week 1: 2025-08-04 - 2025-08-10");
}

#[test]
fn custom_done_status_changes_the_selection() {
  let v = run_json(report_cmd().args(["--done-status", "Done", "--report", "counts"]));
  // ABC-2 only ever reached Testing
  assert_eq!(v[1]["issue_count"], 0);
}

#[test]
fn missing_input_file_is_an_upstream_error() {
  test_support::cmd_bin(super::common::BIN)
    .args(["--input", "does/not/exist.json", "--project", "ABC"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("load tracker export"));
}

#[test]
fn zero_weeks_is_rejected() {
  report_cmd_weeks("0")
    .assert()
    .failure()
    .stderr(predicate::str::contains("--weeks must be at least 1"));
}

#[test]
fn user_tasks_without_author_is_rejected() {
  report_cmd()
    .args(["--report", "user-tasks"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("requires --author"));
}

#[test]
fn malformed_export_is_a_data_integrity_error() {
  let td = test_support::tempdir();
  let path = td.path().join("broken.json");
  std::fs::write(
    &path,
    r#"{"issues": [], "worklogs": {"ABC-1": [{"id": "1", "started": "yesterday", "timeSpentSeconds": 60}]}}"#,
  )
  .unwrap();

  test_support::cmd_bin(super::common::BIN)
    .arg("--input")
    .arg(&path)
    .args(["--project", "ABC"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("data integrity").and(predicate::str::contains("malformed date")));
}
