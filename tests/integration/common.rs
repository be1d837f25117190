use test_support::{cmd_bin, fixture_path};

pub const BIN: &str = "worklog-report";
pub const WEEK_1: &str = "Week 1: 2025-08-11 - 2025-08-17";
pub const WEEK_2: &str = "Week 2: 2025-08-04 - 2025-08-10";

/// Two weeks of project ABC from the tracker export, anchored on Friday 2025-08-15.
pub fn report_cmd() -> assert_cmd::Command {
  report_cmd_weeks("2")
}

/// `report_cmd` with another `--weeks` value; clap rejects the flag given twice.
pub fn report_cmd_weeks(weeks: &str) -> assert_cmd::Command {
  let mut cmd = cmd_bin(BIN);
  cmd.arg("--input").arg(fixture_path("tracker_export.json")).args([
    "--project",
    "ABC",
    "--weeks",
    weeks,
    "--tz",
    "utc",
    "--now-override",
    "2025-08-15T12:00:00Z",
  ]);
  cmd
}

pub fn run_json(cmd: &mut assert_cmd::Command) -> serde_json::Value {
  let out = cmd.output().unwrap();
  assert!(
    out.status.success(),
    "command failed: {}",
    String::from_utf8_lossy(&out.stderr)
  );
  serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}
