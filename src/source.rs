// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Issue-tracker collaborator seam (IssueSource) and a file-backed implementation over an exported tracker dump
// role: boundary/source
// inputs: JSON export {issues: [tracker issue JSON with fields + changelog], worklogs: {KEY: [tracker worklog JSON]}}
// outputs: Typed Issue / WorkLogEntry records; issues filtered by status transition inside a window; an author's week of work logs; done issues never logged
// side_effects: SnapshotSource::from_path reads one file
// invariants:
// - all raw records are validated once, at load; later fetches cannot fail on data shape
// - seconds are converted to hours; a work-log date is the calendar date prefix of `started`
// - a window match needs a transition INTO a done status dated within the window (inclusive) and a current done status
// - authors and assignees match by login or display name
// errors: UpstreamFetch for unreadable/unparseable files; DataIntegrity for missing fields, malformed dates or numbers
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

use crate::error::{ReportError, Result};
use crate::ext::serde_json::JsonFetch;
use crate::model::{AnalysisWindow, DoneTaskWithoutLog, Issue, UNASSIGNED, WorkLogEntry};

/// Statuses an issue must transition into to count as finished in a window.
pub const DEFAULT_DONE_STATUSES: &[&str] = &["Testing", "Done"];

/// Status the "done but never logged" query looks for.
pub const DONE_STATUS: &str = "Done";

/// Author label for work logs whose author was deleted upstream.
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Data the aggregation engine needs from the issue tracker.
pub trait IssueSource {
  /// Issues of `project_key` that moved into a done status during `window`,
  /// optionally restricted to one assignee.
  fn fetch_issues_in_window(
    &self,
    project_key: &str,
    window: &AnalysisWindow,
    username: Option<&str>,
  ) -> Result<Vec<Issue>>;

  fn fetch_worklogs(&self, issue_key: &str) -> Result<Vec<WorkLogEntry>>;

  /// Every entry `author` (login or display name) logged during `window`,
  /// on any issue of any project and status.
  fn fetch_author_worklogs(&self, author: &str, window: &AnalysisWindow) -> Result<Vec<WorkLogEntry>>;

  /// Issues of `project_key` currently in `Done` that have no work log at all,
  /// optionally restricted to one assignee. Not limited to any window.
  fn fetch_done_without_worklogs(
    &self,
    project_key: &str,
    username: Option<&str>,
  ) -> Result<Vec<DoneTaskWithoutLog>>;
}

#[derive(Debug, Clone)]
struct StatusChange {
  date: NaiveDate,
  to: String,
}

#[derive(Debug, Clone)]
struct TrackedWorklog {
  entry: WorkLogEntry,
  author_login: Option<String>,
}

impl TrackedWorklog {
  fn is_by(&self, author: &str) -> bool {
    self.entry.author == author || self.author_login.as_deref() == Some(author)
  }
}

#[derive(Debug, Clone)]
struct TrackedIssue {
  issue: Issue,
  project: String,
  assignee_login: Option<String>,
  changes: Vec<StatusChange>,
}

/// `IssueSource` over a JSON export of the tracker, in export order.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
  issues: Vec<TrackedIssue>,
  worklogs: BTreeMap<String, Vec<TrackedWorklog>>,
  done_statuses: Vec<String>,
}

#[derive(Deserialize)]
struct Named {
  name: String,
}

impl TrackedIssue {
  fn assigned_to(&self, user: &str) -> bool {
    self.assignee_login.as_deref() == Some(user) || self.issue.assignee.as_deref() == Some(user)
  }
}

impl SnapshotSource {
  pub fn from_path(path: &Path) -> Result<Self> {
    let operation = format!("load tracker export {}", path.display());
    let data = std::fs::read(path).map_err(|e| ReportError::upstream(&operation, e))?;
    let value: serde_json::Value = serde_json::from_slice(&data).map_err(|e| ReportError::upstream(&operation, e))?;
    Self::from_value(&value)
  }

  pub fn from_value(value: &serde_json::Value) -> Result<Self> {
    let raw_issues: Vec<serde_json::Value> = value.fetch("issues").require("tracker export")?;
    let issues = raw_issues.iter().map(parse_issue).collect::<Result<Vec<_>>>()?;

    let raw_logs: BTreeMap<String, Vec<serde_json::Value>> = value
      .fetch("worklogs")
      .present()
      .map(|_| value.fetch("worklogs").require("tracker export"))
      .transpose()?
      .unwrap_or_default();

    let mut worklogs = BTreeMap::new();
    for (issue_key, entries) in raw_logs {
      let parsed = entries
        .iter()
        .map(|entry| parse_worklog(&issue_key, entry))
        .collect::<Result<Vec<_>>>()?;
      worklogs.insert(issue_key, parsed);
    }

    tracing::debug!(issues = issues.len(), issues_with_worklogs = worklogs.len(), "loaded tracker export");

    Ok(Self {
      issues,
      worklogs,
      done_statuses: DEFAULT_DONE_STATUSES.iter().map(|s| s.to_string()).collect(),
    })
  }

  /// Replace the statuses that count as "finished".
  pub fn with_done_statuses(mut self, statuses: Vec<String>) -> Self {
    if !statuses.is_empty() {
      self.done_statuses = statuses;
    }
    self
  }

  fn is_done(&self, status: &str) -> bool {
    self.done_statuses.iter().any(|s| s == status)
  }

  fn matches(&self, tracked: &TrackedIssue, project_key: &str, window: &AnalysisWindow, username: Option<&str>) -> bool {
    if tracked.project != project_key || !self.is_done(&tracked.issue.status) {
      return false;
    }
    if username.is_some_and(|user| !tracked.assigned_to(user)) {
      return false;
    }
    tracked
      .changes
      .iter()
      .any(|c| self.is_done(&c.to) && window.contains_date(c.date))
  }
}

impl IssueSource for SnapshotSource {
  fn fetch_issues_in_window(
    &self,
    project_key: &str,
    window: &AnalysisWindow,
    username: Option<&str>,
  ) -> Result<Vec<Issue>> {
    Ok(
      self
        .issues
        .iter()
        .filter(|t| self.matches(t, project_key, window, username))
        .map(|t| t.issue.clone())
        .collect(),
    )
  }

  fn fetch_worklogs(&self, issue_key: &str) -> Result<Vec<WorkLogEntry>> {
    Ok(
      self
        .worklogs
        .get(issue_key)
        .map(|logs| logs.iter().map(|w| w.entry.clone()).collect())
        .unwrap_or_default(),
    )
  }

  fn fetch_author_worklogs(&self, author: &str, window: &AnalysisWindow) -> Result<Vec<WorkLogEntry>> {
    Ok(
      self
        .worklogs
        .values()
        .flatten()
        .filter(|w| w.is_by(author) && window.contains_date(w.entry.date))
        .map(|w| w.entry.clone())
        .collect(),
    )
  }

  fn fetch_done_without_worklogs(
    &self,
    project_key: &str,
    username: Option<&str>,
  ) -> Result<Vec<DoneTaskWithoutLog>> {
    Ok(
      self
        .issues
        .iter()
        .filter(|t| t.project == project_key && t.issue.status == DONE_STATUS)
        .filter(|t| username.map_or(true, |user| t.assigned_to(user)))
        .filter(|t| self.worklogs.get(&t.issue.key).map_or(true, Vec::is_empty))
        .map(|t| DoneTaskWithoutLog {
          key: t.issue.key.clone(),
          summary: t.issue.summary.clone(),
          assignee: t.issue.assignee.clone().unwrap_or_else(|| UNASSIGNED.to_string()),
          status: t.issue.status.clone(),
          created: t.issue.created.map(|d| d.date_naive()),
          updated: t.issue.updated.map(|d| d.date_naive()),
        })
        .collect(),
    )
  }
}

/// Parse tracker timestamps such as `2025-08-12T10:00:00.000+0300` or RFC3339.
pub fn parse_tracker_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
  DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(raw).ok())
}

fn timestamp_field(value: &serde_json::Value, path: &str, context: &str) -> Result<Option<DateTime<FixedOffset>>> {
  let Some(raw) = value.fetch(path).present() else {
    return Ok(None);
  };
  let text = raw
    .as_str()
    .ok_or_else(|| ReportError::integrity(format!("{context}: field '{path}' is not a string")))?;
  parse_tracker_timestamp(text)
    .map(Some)
    .ok_or_else(|| ReportError::integrity(format!("{context}: malformed timestamp '{text}' in '{path}'")))
}

fn seconds_to_hours(value: &serde_json::Value, path: &str, context: &str, required: bool) -> Result<f64> {
  if !required && value.fetch(path).present().is_none() {
    return Ok(0.0);
  }
  let seconds: f64 = value.fetch(path).require(context)?;
  Ok(seconds / SECONDS_PER_HOUR)
}

fn parse_issue(value: &serde_json::Value) -> Result<TrackedIssue> {
  let key: String = value.fetch("key").require("issue")?;
  let context = format!("issue {key}");

  let project = value
    .fetch("fields.project.key")
    .to::<String>()
    .or_else(|| key.split_once('-').map(|(p, _)| p.to_string()))
    .unwrap_or_else(|| key.clone());

  let components: BTreeSet<String> = value
    .fetch("fields.components")
    .to_or_default::<Vec<Named>>()
    .into_iter()
    .map(|c| c.name)
    .collect();

  let issue = Issue {
    summary: value.fetch("fields.summary").require(&context)?,
    status: value.fetch("fields.status.name").require(&context)?,
    assignee: value.fetch("fields.assignee.displayName").to::<String>(),
    reporter: value.fetch("fields.reporter.displayName").to::<String>(),
    estimated_hours: seconds_to_hours(value, "fields.timeoriginalestimate", &context, false)?,
    created: timestamp_field(value, "fields.created", &context)?,
    updated: timestamp_field(value, "fields.updated", &context)?,
    issue_type: value.fetch("fields.issuetype.name").to_or_default(),
    priority: value.fetch("fields.priority.name").to_or_default(),
    components,
    labels: value.fetch("fields.labels").to_or_default(),
    ..Issue::new(key.clone(), String::new())
  };

  let mut changes = Vec::new();
  let histories: Vec<serde_json::Value> = value.fetch("changelog.histories").to_or_default();
  for history in &histories {
    let items: Vec<serde_json::Value> = history.fetch("items").to_or_default();
    let status_items: Vec<&serde_json::Value> = items
      .iter()
      .filter(|item| item.fetch("field").to::<String>().as_deref() == Some("status"))
      .collect();
    if status_items.is_empty() {
      continue;
    }

    let at = timestamp_field(history, "created", &context)?
      .ok_or_else(|| ReportError::integrity(format!("{context}: status change without 'created'")))?;
    for item in status_items {
      changes.push(StatusChange {
        date: at.date_naive(),
        to: item.fetch("toString").require(&context)?,
      });
    }
  }

  Ok(TrackedIssue {
    assignee_login: value.fetch("fields.assignee.name").to::<String>(),
    issue,
    project,
    changes,
  })
}

fn parse_worklog(issue_key: &str, value: &serde_json::Value) -> Result<TrackedWorklog> {
  let id = match value.fetch("id").present() {
    Some(serde_json::Value::String(s)) => s.clone(),
    Some(other) => other.to_string(),
    None => return Err(ReportError::integrity(format!("worklog on {issue_key}: missing field 'id'"))),
  };
  let context = format!("worklog {id} on {issue_key}");

  let started: String = value.fetch("started").require(&context)?;
  let date = started
    .get(..10)
    .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    .ok_or_else(|| ReportError::integrity(format!("{context}: malformed date '{started}'")))?;

  let author = value
    .fetch("author.displayName")
    .to::<String>()
    .or_else(|| value.fetch("author.name").to::<String>())
    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

  let entry = WorkLogEntry {
    id,
    issue_key: issue_key.to_string(),
    author,
    date,
    hours: seconds_to_hours(value, "timeSpentSeconds", &context, true)?,
    comment: value.fetch("comment").to::<String>(),
  };
  Ok(TrackedWorklog { entry, author_login: value.fetch("author.name").to::<String>() })
}
