use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::source::DEFAULT_DONE_STATUSES;
use crate::util;
use crate::window::Tz;

/// Which projection of the analysis is printed to stdout.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
  /// Per-week stats (logged, fallback, totals, tasks without logs)
  Weekly,
  /// Author x week hours table with totals
  Hours,
  /// Tasks that had no work logs at all
  NoLog,
  /// Issue count per week
  Counts,
  /// One author's tasks with their hours (needs --author)
  UserTasks,
  /// One author's hours per weekday of a week, across all their issues (needs --author)
  Daily,
  /// Issues currently Done that have no work log at all, any week
  DoneNoLog,
}

impl ReportKind {
  /// Reports answered straight from the tracker export rather than from a weekly analysis.
  pub fn needs_live_source(self) -> bool {
    matches!(self, ReportKind::Daily | ReportKind::DoneNoLog)
  }

  fn flag_name(self) -> String {
    self.to_possible_value().map(|v| v.get_name().to_string()).unwrap_or_default()
  }
}

#[derive(Parser, Debug)]
#[command(
    name = "worklog-report",
    version,
    about = "Aggregate issue-tracker work logs into weekly time reports (JSON)",
    long_about = None
)]
pub struct Cli {
  /// Tracker export (JSON) to analyse
  #[arg(long, env = "WORKLOG_REPORT_INPUT")]
  pub input: Option<PathBuf>,

  /// Project key, e.g. ABC
  #[arg(long, env = "DEFAULT_PROJECT_KEY")]
  pub project: Option<String>,

  /// Number of weekly windows, most recent first
  #[arg(long, env = "DEFAULT_WEEKS_COUNT", default_value_t = 4)]
  pub weeks: usize,

  /// Only consider issues assigned to this user (login or display name)
  #[arg(long)]
  pub user: Option<String>,

  /// Work-log author (display name; login also works for daily) for the user-tasks and daily reports
  #[arg(long)]
  pub author: Option<String>,

  /// Report to print
  #[arg(long, value_enum, default_value_t = ReportKind::Weekly)]
  pub report: ReportKind,

  /// Reference date: YYYY-MM-DD, RFC3339, or a phrase like "last friday" / "2 weeks ago"
  #[arg(long = "as-of")]
  pub as_of: Option<String>,

  /// Timezone deciding which day "now" is: local, utc, or an IANA name
  #[arg(long, default_value = "local")]
  pub tz: String,

  /// Status counted as "done" (repeatable; default: Testing, Done)
  #[arg(long = "done-status")]
  pub done_status: Vec<String>,

  /// Save the analysis as a timestamped snapshot under --data-dir
  #[arg(long)]
  pub save: bool,

  /// Directory holding saved snapshots
  #[arg(long, env = "DATA_FOLDER", default_value = "data")]
  pub data_dir: PathBuf,

  /// Load the latest saved snapshot for --project instead of analysing --input
  #[arg(long)]
  pub from_snapshot: bool,

  /// Snapshots kept after --save (oldest removed first)
  #[arg(long, default_value_t = 20)]
  pub keep: usize,

  /// Window label for the daily report (default: most recent week)
  #[arg(long)]
  pub week: Option<String>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant for date resolution (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub input: Option<String>, // absolute path for stability
  pub project: String,
  pub weeks: usize,
  pub user: Option<String>,
  pub author: Option<String>,
  pub report: ReportKind,
  pub as_of: Option<String>,
  pub tz: Tz,
  pub done_statuses: Vec<String>,
  pub save: bool,
  pub data_dir: String,
  pub from_snapshot: bool,
  pub keep: usize,
  pub week: Option<String>,
  pub now_override: Option<String>,
}

fn non_blank(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let Some(project) = non_blank(cli.project) else {
    bail!("Provide --project (or set DEFAULT_PROJECT_KEY)")
  };

  if cli.weeks == 0 {
    bail!("--weeks must be at least 1");
  }

  let user = non_blank(cli.user);
  let as_of = non_blank(cli.as_of);

  let input = match (&cli.input, cli.from_snapshot) {
    (Some(p), false) => Some(util::canonicalize_lossy(p)),
    (None, false) => bail!("Provide --input (or set WORKLOG_REPORT_INPUT), or use --from-snapshot"),
    (_, true) if cli.save => bail!("--save cannot be combined with --from-snapshot"),
    (_, true) if cli.report.needs_live_source() => {
      bail!("--report {} reads the tracker export; it cannot use --from-snapshot", cli.report.flag_name())
    }
    // a snapshot is already filtered and anchored
    (_, true) if user.is_some() || as_of.is_some() => {
      bail!("--user and --as-of cannot be combined with --from-snapshot")
    }
    (p, true) => p.as_deref().map(util::canonicalize_lossy),
  };

  if cli.save && cli.report.needs_live_source() {
    bail!("--save stores weekly analyses; it does not apply to --report {}", cli.report.flag_name());
  }

  let author = non_blank(cli.author);
  if matches!(cli.report, ReportKind::UserTasks | ReportKind::Daily) && author.is_none() {
    bail!("--report {} requires --author", cli.report.flag_name());
  }
  if cli.week.is_some() && cli.report != ReportKind::Daily {
    bail!("--week only applies to --report daily");
  }

  let tz: Tz = cli.tz.parse()?;

  let done_statuses = if cli.done_status.is_empty() {
    DEFAULT_DONE_STATUSES.iter().map(|s| s.to_string()).collect()
  } else {
    cli.done_status
  };

  Ok(EffectiveConfig {
    input,
    project,
    weeks: cli.weeks,
    user,
    author,
    report: cli.report,
    as_of,
    tz,
    done_statuses,
    save: cli.save,
    data_dir: util::canonicalize_lossy(&cli.data_dir),
    from_snapshot: cli.from_snapshot,
    keep: cli.keep,
    week: non_blank(cli.week),
    now_override: cli.now_override.clone(),
  })
}
