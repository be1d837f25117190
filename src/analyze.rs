// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one analysis: compute windows, pull issues/work logs from an IssueSource, aggregate, bundle raw data
// role: processing/orchestrator
// inputs: IssueSource, project key, window count, optional username, reference date
// outputs: AnalysisResult {weekly, raw}; an author's DailyBreakdown for one window; done issues without work logs
// side_effects: Calls the source; emits tracing events (the only logging point of the engine)
// invariants:
// - work logs are fetched at most once per issue key per call
// - no partial result: any source or integrity error aborts the call
// errors: InvalidArgument for window_count == 0; UpstreamFetch propagated unchanged; DataIntegrity from aggregation
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, bundle_raw};
use crate::error::{ReportError, Result};
use crate::model::{AnalysisResult, AnalysisWindow, DoneTaskWithoutLog, Issue, WorkLogEntry};
use crate::report::{DailyBreakdown, daily_breakdown};
use crate::source::IssueSource;
use crate::window::compute_windows;

pub struct Analyzer<S> {
  source: S,
}

impl<S: IssueSource> Analyzer<S> {
  pub fn new(source: S) -> Self {
    Self { source }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Analyse `window_count` weeks of `project_key` ending with the week of `reference_date`.
  #[tracing::instrument(level = "info", skip(self), err)]
  pub fn analyze(
    &self,
    project_key: &str,
    window_count: usize,
    username: Option<&str>,
    reference_date: NaiveDate,
  ) -> Result<AnalysisResult> {
    if window_count == 0 {
      return Err(ReportError::InvalidArgument("window count must be at least 1".into()));
    }

    let windows = compute_windows(reference_date, window_count);
    let mut issues_by_window: HashMap<String, Vec<Issue>> = HashMap::with_capacity(windows.len());
    let mut worklogs_by_issue: HashMap<String, Vec<WorkLogEntry>> = HashMap::new();

    for window in &windows {
      let issues = self.source.fetch_issues_in_window(project_key, window, username)?;
      debug!(window = %window.label, issues = issues.len(), "fetched issues");

      for issue in &issues {
        if worklogs_by_issue.contains_key(&issue.key) {
          continue;
        }
        let logs = self.source.fetch_worklogs(&issue.key)?;
        worklogs_by_issue.insert(issue.key.clone(), logs);
      }
      issues_by_window.insert(window.label.clone(), issues);
    }

    for entry in worklogs_by_issue.values().flatten().filter(|w| w.hours < 0.0) {
      warn!(issue = %entry.issue_key, worklog = %entry.id, hours = entry.hours, "negative work-log hours passed through");
    }

    let weekly = aggregate(&windows, &issues_by_window, &worklogs_by_issue)?;
    let raw = bundle_raw(&windows, &issues_by_window, &worklogs_by_issue);

    info!(
      windows = weekly.len(),
      issues = raw.issues.len(),
      issues_with_worklogs = raw.worklogs.len(),
      "analysis complete"
    );

    Ok(AnalysisResult {
      project_key: project_key.to_string(),
      username: username.map(str::to_string),
      weekly,
      raw,
    })
  }

  /// Per-day hours of `author` in `window`, over every issue they logged on.
  #[tracing::instrument(level = "info", skip(self, window), fields(window = %window.label), err)]
  pub fn author_week(&self, author: &str, window: &AnalysisWindow) -> Result<DailyBreakdown> {
    let logs = self.source.fetch_author_worklogs(author, window)?;
    debug!(entries = logs.len(), "fetched author work logs");
    Ok(daily_breakdown(author, window, &logs))
  }

  /// Done issues of `project_key` that nobody logged time on.
  #[tracing::instrument(level = "info", skip(self), err)]
  pub fn done_without_worklogs(&self, project_key: &str, username: Option<&str>) -> Result<Vec<DoneTaskWithoutLog>> {
    let tasks = self.source.fetch_done_without_worklogs(project_key, username)?;
    info!(tasks = tasks.len(), "done issues without work logs");
    Ok(tasks)
  }
}
