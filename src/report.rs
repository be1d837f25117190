// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Derive reporting views (hours table, no-log tasks, issue counts, per-user task detail) from an AnalysisResult, plus the per-day view of one author's week
// role: projection/reporting
// inputs: AnalysisResult (weekly stats + raw bundle); author name, window and that author's work logs for the daily view
// outputs: Serializable view structs; never touches the tracker
// invariants:
// - hours table cells are 0.0 when absent, never missing; rows sorted by total desc then author asc
// - no_log_tasks holds no two entries with the same key (first occurrence wins)
// - user_task_detail is a stable sort by hours desc; encounter order breaks ties
// - sums of nothing are +0.0
// errors: none; all views are total functions
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{AnalysisResult, AnalysisWindow, NoLogIssue, WorkLogEntry};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HoursRow {
  pub author: String,
  /// One cell per column, same order as `HoursTable::columns`.
  pub hours: Vec<f64>,
  pub total: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HoursTable {
  pub columns: Vec<String>,
  pub rows: Vec<HoursRow>,
  pub column_totals: Vec<f64>,
  pub grand_total: f64,
}

impl HoursTable {
  pub fn row(&self, author: &str) -> Option<&HoursRow> {
    self.rows.iter().find(|r| r.author == author)
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeekIssueCount {
  pub label: String,
  pub issue_count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserTask {
  pub key: String,
  pub summary: String,
  pub status: String,
  pub hours: f64,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub worklogs: Vec<WorkLogEntry>,
  /// Hours come from the estimate because nothing was logged.
  pub estimated: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayHours {
  pub weekday: String,
  pub date: NaiveDate,
  pub hours: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyBreakdown {
  pub author: String,
  pub window: String,
  pub days: Vec<DayHours>,
  pub total_hours: f64,
  pub tasks_count: usize,
  /// The entries behind `days`, oldest first.
  pub worklogs: Vec<WorkLogEntry>,
}

/// Author × week table of total hours with row and column sums.
pub fn hours_table(result: &AnalysisResult) -> HoursTable {
  let columns = result.weekly.labels();
  let authors: BTreeSet<&str> = result
    .weekly
    .iter()
    .flat_map(|s| s.total_hours.keys().map(String::as_str))
    .collect();

  let mut rows: Vec<HoursRow> = authors
    .into_iter()
    .map(|author| {
      let hours: Vec<f64> = result
        .weekly
        .iter()
        .map(|s| s.total_hours.get(author).copied().unwrap_or(0.0))
        .collect();
      let total = sum_hours(hours.iter().copied());
      HoursRow { author: author.to_string(), hours, total }
    })
    .collect();

  rows.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.author.cmp(&b.author)));

  let column_totals: Vec<f64> = (0..columns.len())
    .map(|col| sum_hours(rows.iter().map(|r| r.hours[col])))
    .collect();
  let grand_total = sum_hours(rows.iter().map(|r| r.total));

  HoursTable { columns, rows, column_totals, grand_total }
}

/// Every issue reported without work logs, unique by key.
pub fn no_log_tasks(result: &AnalysisResult) -> Vec<NoLogIssue> {
  let mut seen: HashSet<&str> = HashSet::new();
  result
    .weekly
    .iter()
    .flat_map(|s| s.issues_without_log.iter())
    .filter(|task| seen.insert(task.key.as_str()))
    .cloned()
    .collect()
}

pub fn issue_counts(result: &AnalysisResult) -> Vec<WeekIssueCount> {
  result
    .weekly
    .iter()
    .map(|s| WeekIssueCount { label: s.label.clone(), issue_count: s.issue_count })
    .collect()
}

/// Issues `author` worked on inside any analysed window, plus their no-log
/// assignments, heaviest first.
pub fn user_task_detail(result: &AnalysisResult, author: &str) -> Vec<UserTask> {
  let raw = &result.raw;
  let mut tasks: Vec<UserTask> = Vec::new();

  for issue in &raw.issues {
    let worklogs: Vec<WorkLogEntry> = raw
      .worklogs_for(&issue.key)
      .iter()
      .filter(|w| w.author == author && raw.in_any_window(w.date))
      .cloned()
      .collect();
    if worklogs.is_empty() {
      continue;
    }

    tasks.push(UserTask {
      key: issue.key.clone(),
      summary: issue.summary.clone(),
      status: issue.status.clone(),
      hours: sum_hours(worklogs.iter().map(|w| w.hours)),
      worklogs,
      estimated: false,
    });
  }

  for task in no_log_tasks(result) {
    if task.assignee != author || tasks.iter().any(|t| t.key == task.key) {
      continue;
    }
    tasks.push(UserTask {
      key: task.key,
      summary: task.summary,
      status: task.status,
      hours: task.estimated_hours,
      worklogs: Vec::new(),
      estimated: true,
    });
  }

  tasks.sort_by(|a, b| b.hours.total_cmp(&a.hours));
  tasks
}

/// Hours `author` logged on each day of `window`.
///
/// `worklogs` are the author's entries across all issues, whatever their
/// status; entries dated outside the window are ignored.
pub fn daily_breakdown(author: &str, window: &AnalysisWindow, worklogs: &[WorkLogEntry]) -> DailyBreakdown {
  let mut mine: Vec<WorkLogEntry> = worklogs
    .iter()
    .filter(|w| window.contains_date(w.date))
    .cloned()
    .collect();
  mine.sort_by(|a, b| a.date.cmp(&b.date));

  let days: Vec<DayHours> = window
    .start_date()
    .iter_days()
    .take(7)
    .map(|date| DayHours {
      weekday: date.format("%A").to_string(),
      date,
      hours: sum_hours(mine.iter().filter(|w| w.date == date).map(|w| w.hours)),
    })
    .collect();

  let tasks_count = mine.iter().map(|w| w.issue_key.as_str()).collect::<HashSet<_>>().len();

  DailyBreakdown {
    author: author.to_string(),
    window: window.label.clone(),
    total_hours: sum_hours(days.iter().map(|d| d.hours)),
    days,
    tasks_count,
    worklogs: mine,
  }
}

// `Iterator::sum` over no f64 yields -0.0, which would print as "-0.0".
fn sum_hours(hours: impl Iterator<Item = f64>) -> f64 {
  hours.fold(0.0, |acc, h| acc + h)
}
