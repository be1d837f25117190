// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Small helpers for paths, the effective "now", JSON printing and man page rendering
// role: utilities/helpers
// inputs: paths; optional DateTime override; Serialize values; clap CommandFactory
// outputs: Canonicalized paths, timestamps, pretty JSON text, man page text
// side_effects: none
// invariants:
// - canonicalize_lossy always returns an absolute path string, even for paths that do not exist yet
// errors: JSON and man page rendering errors bubble up via anyhow
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::CommandFactory;
use serde::Serialize;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current local time is used.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

/// Pretty JSON with a trailing newline, ready for stdout.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
  let mut text = serde_json::to_string_pretty(value)?;
  text.push('\n');
  Ok(text)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
