// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Bucket work-log entries into weekly windows and reconcile logged vs. estimated hours per author
// role: aggregation/core
// inputs: AnalysisWindow[] (most recent first), issues per window label, work logs per issue key
// outputs: WeeklyStats (one WeeklyStat per window, same order) and the RawDataBundle for detail queries
// side_effects: None; pure functions, no logging
// invariants:
// - each issue key is processed once, in window order then source order
// - an issue without work logs lands in issues_without_log of exactly one window (its first-observed one)
// - entries are credited to the window whose dates contain entry.date; entries outside every window only stay in the raw bundle
// - total_hours[u] == logged_hours[u] + estimated_fallback_hours[u] over the union of both key sets
// errors: DataIntegrity for non-finite hours or entries filed under a different issue; InvalidArgument for duplicate window labels
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{ReportError, Result};
use crate::model::{AnalysisWindow, Issue, NoLogIssue, RawDataBundle, WeeklyStat, WeeklyStats, WorkLogEntry};

/// Issues unique by key, each paired with the index of the window it was first observed in.
pub fn first_observed<'a>(
  windows: &[AnalysisWindow],
  issues_by_window: &'a HashMap<String, Vec<Issue>>,
) -> Vec<(&'a Issue, usize)> {
  let mut seen: HashSet<&str> = HashSet::new();
  let mut out = Vec::new();

  for (idx, window) in windows.iter().enumerate() {
    let Some(issues) = issues_by_window.get(&window.label) else {
      continue;
    };
    for issue in issues {
      if seen.insert(issue.key.as_str()) {
        out.push((issue, idx));
      }
    }
  }

  out
}

/// Aggregate raw issues and work logs into one `WeeklyStat` per window.
pub fn aggregate(
  windows: &[AnalysisWindow],
  issues_by_window: &HashMap<String, Vec<Issue>>,
  worklogs_by_issue: &HashMap<String, Vec<WorkLogEntry>>,
) -> Result<WeeklyStats> {
  ensure_unique_labels(windows)?;

  let mut stats: Vec<WeeklyStat> = windows
    .iter()
    .map(|w| {
      let mut stat = WeeklyStat::empty(w);
      stat.issue_count = issues_by_window.get(&w.label).map_or(0, Vec::len);
      stat
    })
    .collect();

  for (issue, first_idx) in first_observed(windows, issues_by_window) {
    let entries = worklogs_by_issue.get(&issue.key).map(Vec::as_slice).unwrap_or(&[]);

    if entries.is_empty() {
      ensure_finite(issue.estimated_hours, || format!("issue {} estimate", issue.key))?;
      let stat = &mut stats[first_idx];
      let assignee = issue.assignee_or_unassigned().to_string();

      *stat.estimated_fallback_hours.entry(assignee.clone()).or_insert(0.0) += issue.estimated_hours;
      stat.issues_without_log.push(NoLogIssue {
        key: issue.key.clone(),
        summary: issue.summary.clone(),
        status: issue.status.clone(),
        assignee,
        estimated_hours: issue.estimated_hours,
        window: stat.label.clone(),
      });
      continue;
    }

    for entry in entries {
      check_entry(issue, entry)?;

      let Some(idx) = windows.iter().position(|w| w.contains_date(entry.date)) else {
        continue;
      };
      let stat = &mut stats[idx];
      *stat.logged_hours.entry(entry.author.clone()).or_insert(0.0) += entry.hours;
      stat
        .worklogs_by_issue
        .entry(issue.key.clone())
        .or_default()
        .push(entry.clone());
    }
  }

  for stat in &mut stats {
    stat.total_hours = combine_hours(&stat.logged_hours, &stat.estimated_fallback_hours);
  }

  Ok(WeeklyStats::new(stats))
}

/// Collect the raw data for later detail queries: unique issues in first-seen
/// order and every work-log entry recorded against them.
pub fn bundle_raw(
  windows: &[AnalysisWindow],
  issues_by_window: &HashMap<String, Vec<Issue>>,
  worklogs_by_issue: &HashMap<String, Vec<WorkLogEntry>>,
) -> RawDataBundle {
  let issues: Vec<Issue> = first_observed(windows, issues_by_window)
    .into_iter()
    .map(|(issue, _)| issue.clone())
    .collect();

  let worklogs: BTreeMap<String, Vec<WorkLogEntry>> = issues
    .iter()
    .filter_map(|issue| {
      worklogs_by_issue
        .get(&issue.key)
        .filter(|entries| !entries.is_empty())
        .map(|entries| (issue.key.clone(), entries.clone()))
    })
    .collect();

  RawDataBundle { windows: windows.to_vec(), issues, worklogs }
}

/// Sum two author → hours maps over the union of their keys.
pub fn combine_hours(logged: &BTreeMap<String, f64>, estimated: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
  let mut total = logged.clone();
  for (author, hours) in estimated {
    *total.entry(author.clone()).or_insert(0.0) += hours;
  }
  total
}

fn ensure_unique_labels(windows: &[AnalysisWindow]) -> Result<()> {
  let mut labels: HashSet<&str> = HashSet::new();
  for w in windows {
    if !labels.insert(w.label.as_str()) {
      return Err(ReportError::InvalidArgument(format!("duplicate window label '{}'", w.label)));
    }
  }
  Ok(())
}

fn ensure_finite(value: f64, what: impl FnOnce() -> String) -> Result<()> {
  if value.is_finite() {
    Ok(())
  } else {
    Err(ReportError::integrity(format!("{} is not a finite number: {value}", what())))
  }
}

fn check_entry(issue: &Issue, entry: &WorkLogEntry) -> Result<()> {
  if entry.issue_key != issue.key {
    return Err(ReportError::integrity(format!(
      "worklog {} belongs to {} but was filed under {}",
      entry.id, entry.issue_key, issue.key
    )));
  }
  ensure_finite(entry.hours, || format!("worklog {} hours", entry.id))
}
