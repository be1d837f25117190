use chrono::NaiveDate;
use worklog_report::model::AnalysisResult;
use worklog_report::{Analyzer, SnapshotSource, report};

fn analysed() -> AnalysisResult {
  test_support::init_tracing();
  test_support::init_insta();
  let source = SnapshotSource::from_path(&test_support::fixture_path("tracker_export.json")).unwrap();
  Analyzer::new(source)
    .analyze("ABC", 2, None, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap())
    .unwrap()
}

#[test]
fn hours_table_snapshot() {
  insta::assert_json_snapshot!(report::hours_table(&analysed()), @r###"
  {
    "columns": [
      "Week 1: 2025-08-11 - 2025-08-17",
      "Week 2: 2025-08-04 - 2025-08-10"
    ],
    "rows": [
      {
        "author": "Alice Smith",
        "hours": [
          14.0,
          0.0
        ],
        "total": 14.0
      },
      {
        "author": "Bob Jones",
        "hours": [
          0.0,
          3.0
        ],
        "total": 3.0
      }
    ],
    "column_totals": [
      14.0,
      3.0
    ],
    "grand_total": 17.0
  }
  "###);
}

#[test]
fn no_log_tasks_snapshot() {
  insta::assert_json_snapshot!(report::no_log_tasks(&analysed()), @r###"
  [
    {
      "key": "ABC-1",
      "summary": "Login page",
      "status": "Done",
      "assignee": "Alice Smith",
      "estimated_hours": 8.0,
      "window": "Week 1: 2025-08-11 - 2025-08-17"
    }
  ]
  "###);
}
