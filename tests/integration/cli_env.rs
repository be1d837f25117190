use clap::Parser;
use serial_test::serial;
use test_support::with_env;
use worklog_report::cli::{Cli, normalize};

use super::common::{BIN, WEEK_1};

#[test]
#[serial]
fn env_fallbacks_fill_missing_flags() {
  let _env = with_env(&[
    ("DEFAULT_PROJECT_KEY", "ENV"),
    ("DEFAULT_WEEKS_COUNT", "3"),
    ("WORKLOG_REPORT_INPUT", "export.json"),
  ]);

  let cfg = normalize(Cli::try_parse_from(["worklog-report"]).unwrap()).unwrap();
  assert_eq!(cfg.project, "ENV");
  assert_eq!(cfg.weeks, 3);
  assert!(cfg.input.unwrap().ends_with("export.json"));
}

#[test]
#[serial]
fn flags_win_over_env() {
  let _env = with_env(&[("DEFAULT_PROJECT_KEY", "ENV"), ("DEFAULT_WEEKS_COUNT", "3")]);

  let cli = Cli::try_parse_from(["worklog-report", "--project", "ABC", "--weeks", "1", "--input", "x.json"]).unwrap();
  let cfg = normalize(cli).unwrap();
  assert_eq!(cfg.project, "ABC");
  assert_eq!(cfg.weeks, 1);
}

#[test]
fn binary_reads_settings_from_env() {
  let out = test_support::cmd_bin(BIN)
    .env("WORKLOG_REPORT_INPUT", test_support::fixture_path("tracker_export.json"))
    .env("DEFAULT_PROJECT_KEY", "ABC")
    .env("DEFAULT_WEEKS_COUNT", "1")
    .args(["--tz", "utc", "--now-override", "2025-08-15T12:00:00Z", "--report", "counts"])
    .output()
    .unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v, serde_json::json!([{ "label": WEEK_1, "issue_count": 2 }]));
}
