use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use worklog_report::analyze::Analyzer;
use worklog_report::cli::{Cli, EffectiveConfig, ReportKind, normalize};
use worklog_report::model::AnalysisResult;
use worklog_report::source::SnapshotSource;
use worklog_report::{report, snapshot, util, window};

fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  // stdout carries the JSON report
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}

fn main() -> Result<()> {
  init_logging();
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  tracing::debug!(config = ?cfg, "effective configuration");

  // Phase 2: resolve now
  let now = util::effective_now(window::parse_now_override(cfg.now_override.as_deref()));

  // Phase 3: answer straight from the export when the report is not weekly
  match cfg.report {
    ReportKind::Daily => {
      let windows = window::compute_windows(reference_date(&cfg, now)?, cfg.weeks);
      let selected = window::select_window(&windows, cfg.week.as_deref())?;
      let author = cfg.author.as_deref().unwrap_or_default();
      let daily = analyzer(&cfg)?.author_week(author, selected)?;
      print!("{}", util::to_pretty_json(&daily)?);
      return Ok(());
    }
    ReportKind::DoneNoLog => {
      let tasks = analyzer(&cfg)?.done_without_worklogs(&cfg.project, cfg.user.as_deref())?;
      print!("{}", util::to_pretty_json(&tasks)?);
      return Ok(());
    }
    _ => {}
  }

  // Phase 4: analyse (or reload) and persist
  let result = if cfg.from_snapshot {
    load_snapshot(&cfg)?
  } else {
    let result = run_analysis(&cfg, now)?;
    if cfg.save {
      let dir = Path::new(&cfg.data_dir);
      snapshot::save_snapshot(dir, &result, now)?;
      let removed = snapshot::cleanup_old_snapshots(dir, cfg.keep)?;
      tracing::info!(removed, keep = cfg.keep, "snapshot cleanup");
    }
    result
  };

  // Phase 5: print the requested projection
  print!("{}", render_report(&cfg, &result)?);
  Ok(())
}

fn analyzer(cfg: &EffectiveConfig) -> Result<Analyzer<SnapshotSource>> {
  let Some(input) = cfg.input.as_deref() else {
    bail!("no --input to analyse");
  };
  let source = SnapshotSource::from_path(Path::new(input))?.with_done_statuses(cfg.done_statuses.clone());
  Ok(Analyzer::new(source))
}

fn reference_date(cfg: &EffectiveConfig, now: DateTime<Local>) -> Result<NaiveDate> {
  let today = window::now_in_zone(&cfg.tz, now)?;
  window::resolve_reference_date(cfg.as_of.as_deref(), today)
}

fn load_snapshot(cfg: &EffectiveConfig) -> Result<AnalysisResult> {
  let Some(result) = snapshot::load_latest_snapshot(Path::new(&cfg.data_dir), &cfg.project)? else {
    bail!("no saved snapshot for project {} in {}", cfg.project, cfg.data_dir);
  };

  if let Some(user) = result.username.as_deref() {
    tracing::warn!(user, "snapshot was analysed for a single assignee");
  }
  if result.weekly.len() != cfg.weeks {
    tracing::warn!(saved = result.weekly.len(), requested = cfg.weeks, "snapshot covers a different number of weeks");
  }
  Ok(result)
}

fn run_analysis(cfg: &EffectiveConfig, now: DateTime<Local>) -> Result<AnalysisResult> {
  let analyzer = analyzer(cfg)?;
  let reference_date = reference_date(cfg, now)?;
  tracing::info!(
    project = %cfg.project,
    weeks = cfg.weeks,
    user = cfg.user.as_deref().unwrap_or("-"),
    %reference_date,
    "starting analysis"
  );

  analyzer
    .analyze(&cfg.project, cfg.weeks, cfg.user.as_deref(), reference_date)
    .with_context(|| format!("analysing project {}", cfg.project))
}

fn render_report(cfg: &EffectiveConfig, result: &AnalysisResult) -> Result<String> {
  let author = cfg.author.as_deref().unwrap_or_default();

  match cfg.report {
    ReportKind::Weekly => util::to_pretty_json(&result.weekly),
    ReportKind::Hours => util::to_pretty_json(&report::hours_table(result)),
    ReportKind::NoLog => util::to_pretty_json(&report::no_log_tasks(result)),
    ReportKind::Counts => util::to_pretty_json(&report::issue_counts(result)),
    ReportKind::UserTasks => util::to_pretty_json(&report::user_task_detail(result, author)),
    ReportKind::Daily | ReportKind::DoneNoLog => bail!("--report {:?} is not derived from a weekly analysis", cfg.report),
  }
}
