// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the record types (issues, work logs, windows, weekly stats, analysis result) shared by aggregation and reporting
// role: model/types
// outputs: Serializable structs with stable field names
// invariants: total_hours == logged_hours + estimated_fallback_hours per author; WeeklyStats keeps window order (most recent first)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Attribution label for issues that have no assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// One Monday..Sunday calendar week used to bucket work logs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AnalysisWindow {
  pub label: String,
  pub start: NaiveDateTime,
  pub end: NaiveDateTime,
}

impl AnalysisWindow {
  pub fn start_date(&self) -> NaiveDate {
    self.start.date()
  }

  pub fn end_date(&self) -> NaiveDate {
    self.end.date()
  }

  /// Inclusive on both ends, compared by calendar date only.
  pub fn contains_date(&self, date: NaiveDate) -> bool {
    self.start_date() <= date && date <= self.end_date()
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Issue {
  pub key: String,
  pub summary: String,
  pub status: String,
  pub assignee: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reporter: Option<String>,
  pub estimated_hours: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created: Option<DateTime<FixedOffset>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated: Option<DateTime<FixedOffset>>,
  pub issue_type: String,
  pub priority: String,
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub components: BTreeSet<String>,
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub labels: BTreeSet<String>,
}

impl Issue {
  /// Minimal issue with empty metadata; fill the rest with struct update syntax.
  pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      summary: summary.into(),
      status: String::new(),
      assignee: None,
      reporter: None,
      estimated_hours: 0.0,
      created: None,
      updated: None,
      issue_type: String::new(),
      priority: String::new(),
      components: BTreeSet::new(),
      labels: BTreeSet::new(),
    }
  }

  /// Assignee name used for attribution; never empty.
  pub fn assignee_or_unassigned(&self) -> &str {
    match self.assignee.as_deref() {
      Some(name) if !name.trim().is_empty() => name,
      _ => UNASSIGNED,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkLogEntry {
  pub id: String,
  pub issue_key: String,
  pub author: String,
  pub date: NaiveDate,
  pub hours: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
}

/// An issue that had no work logged, reported in the week it was first seen.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NoLogIssue {
  pub key: String,
  pub summary: String,
  pub status: String,
  pub assignee: String,
  pub estimated_hours: f64,
  pub window: String,
}

/// A finished issue nobody ever logged time against, regardless of week.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DoneTaskWithoutLog {
  pub key: String,
  pub summary: String,
  pub assignee: String,
  pub status: String,
  pub created: Option<NaiveDate>,
  pub updated: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeeklyStat {
  pub label: String,
  pub start: NaiveDateTime,
  pub end: NaiveDateTime,
  pub logged_hours: BTreeMap<String, f64>,
  pub estimated_fallback_hours: BTreeMap<String, f64>,
  pub total_hours: BTreeMap<String, f64>,
  pub issues_without_log: Vec<NoLogIssue>,
  pub issue_count: usize,
  pub worklogs_by_issue: BTreeMap<String, Vec<WorkLogEntry>>,
}

impl WeeklyStat {
  pub fn empty(window: &AnalysisWindow) -> Self {
    Self {
      label: window.label.clone(),
      start: window.start,
      end: window.end,
      logged_hours: BTreeMap::new(),
      estimated_fallback_hours: BTreeMap::new(),
      total_hours: BTreeMap::new(),
      issues_without_log: Vec::new(),
      issue_count: 0,
      worklogs_by_issue: BTreeMap::new(),
    }
  }
}

/// Per-week stats in window order (most recent first), addressable by label.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct WeeklyStats(Vec<WeeklyStat>);

impl WeeklyStats {
  pub fn new(stats: Vec<WeeklyStat>) -> Self {
    Self(stats)
  }

  pub fn get(&self, label: &str) -> Option<&WeeklyStat> {
    self.0.iter().find(|s| s.label == label)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, WeeklyStat> {
    self.0.iter()
  }

  pub fn labels(&self) -> Vec<String> {
    self.0.iter().map(|s| s.label.clone()).collect()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<'a> IntoIterator for &'a WeeklyStats {
  type Item = &'a WeeklyStat;
  type IntoIter = std::slice::Iter<'a, WeeklyStat>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

/// Everything fetched for one analysis, kept for detail queries.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RawDataBundle {
  pub windows: Vec<AnalysisWindow>,
  /// Unique by key, in first-seen order.
  pub issues: Vec<Issue>,
  /// All entries per issue, including those dated outside every window.
  pub worklogs: BTreeMap<String, Vec<WorkLogEntry>>,
}

impl RawDataBundle {
  pub fn worklogs_for(&self, key: &str) -> &[WorkLogEntry] {
    self.worklogs.get(key).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn in_any_window(&self, date: NaiveDate) -> bool {
    self.windows.iter().any(|w| w.contains_date(date))
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisResult {
  pub project_key: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  pub weekly: WeeklyStats,
  pub raw: RawDataBundle,
}
