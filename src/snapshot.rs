// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Persist and reload analysis results as timestamped JSON files for later detail queries
// role: persistence/snapshot
// inputs: data dir, project key, AnalysisResult, generated_at
// outputs: <project>_stats_<YYYYmmdd_HHMMSS>.json files under the data dir
// side_effects: Creates the data dir; writes and deletes files
// invariants:
// - file names sort chronologically; latest = greatest timestamp for the project
// - cleanup keeps the newest `max_files` snapshots across all projects
// errors: IO and JSON errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::AnalysisResult;

static SNAPSHOT_NAME: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(?P<project>.+)_stats_(?P<ts>\d{8}_\d{6})\.json$").expect("valid snapshot regex"));

struct SnapshotFile {
  project: String,
  stamp: String,
  path: PathBuf,
}

pub fn snapshot_file_name(project_key: &str, generated_at: DateTime<Local>) -> String {
  format!("{}_stats_{}.json", project_key, generated_at.format("%Y%m%d_%H%M%S"))
}

fn list_snapshots(dir: &Path) -> Result<Vec<SnapshotFile>> {
  if !dir.exists() {
    return Ok(Vec::new());
  }

  let mut out = Vec::new();
  for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
    let entry = entry.with_context(|| format!("reading {}", dir.display()))?;
    let name = entry.file_name().to_string_lossy().to_string();
    if let Some(caps) = SNAPSHOT_NAME.captures(&name) {
      out.push(SnapshotFile {
        project: caps["project"].to_string(),
        stamp: caps["ts"].to_string(),
        path: entry.path(),
      });
    }
  }
  out.sort_by(|a, b| a.stamp.cmp(&b.stamp).then_with(|| a.path.cmp(&b.path)));
  Ok(out)
}

/// Write `result` to `<dir>/<project>_stats_<timestamp>.json`, creating `dir`.
pub fn save_snapshot(dir: &Path, result: &AnalysisResult, generated_at: DateTime<Local>) -> Result<PathBuf> {
  std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

  let path = dir.join(snapshot_file_name(&result.project_key, generated_at));
  std::fs::write(&path, serde_json::to_vec_pretty(result)?).with_context(|| format!("writing {}", path.display()))?;

  tracing::info!(path = %path.display(), "saved analysis snapshot");
  Ok(path)
}

/// Most recent snapshot for `project_key`, or `None` when nothing was saved yet.
pub fn load_latest_snapshot(dir: &Path, project_key: &str) -> Result<Option<AnalysisResult>> {
  let Some(latest) = list_snapshots(dir)?
    .into_iter()
    .filter(|s| s.project == project_key)
    .next_back()
  else {
    tracing::info!(project = project_key, dir = %dir.display(), "no saved snapshot");
    return Ok(None);
  };

  let data = std::fs::read(&latest.path).with_context(|| format!("reading {}", latest.path.display()))?;
  let result: AnalysisResult =
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", latest.path.display()))?;

  tracing::info!(path = %latest.path.display(), "loaded analysis snapshot");
  Ok(Some(result))
}

/// Delete the oldest snapshots so at most `max_files` remain; returns how many were removed.
pub fn cleanup_old_snapshots(dir: &Path, max_files: usize) -> Result<usize> {
  let files = list_snapshots(dir)?;
  if files.len() <= max_files {
    return Ok(0);
  }

  let excess = files.len() - max_files;
  for old in files.iter().take(excess) {
    std::fs::remove_file(&old.path).with_context(|| format!("removing {}", old.path.display()))?;
    tracing::info!(path = %old.path.display(), "removed old snapshot");
  }
  Ok(excess)
}
