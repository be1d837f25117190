use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_english::{Interval, parse_duration};
use serde::{Deserialize, Serialize};
use two_timer::parse as parse_natural;

use crate::model::AnalysisWindow;

// Week arithmetic and reference-date resolution live here to keep the engine focused.

/// Timezone used to decide which calendar day "now" falls on.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tz {
  Local,
  Utc,
  Named(String),
}

impl std::str::FromStr for Tz {
  type Err = anyhow::Error;

  fn from_str(raw: &str) -> Result<Self> {
    if raw.eq_ignore_ascii_case("local") {
      return Ok(Tz::Local);
    }
    if raw.eq_ignore_ascii_case("utc") {
      return Ok(Tz::Utc);
    }
    raw
      .parse::<chrono_tz::Tz>()
      .map(|_| Tz::Named(raw.to_string()))
      .map_err(|e| anyhow::anyhow!("unknown timezone '{raw}': {e}"))
  }
}

/// Monday of the calendar week containing `date`; `None` before the first representable Monday.
pub fn start_of_week(date: NaiveDate) -> Option<NaiveDate> {
  date.checked_sub_days(Days::new(date.weekday().num_days_from_monday().into()))
}

/// Build `count` contiguous Monday..Sunday windows, most recent first.
///
/// Window 0 is the week containing `reference_date`; window `i` is `i` weeks
/// earlier. Each ends at Sunday 23:59:59. Near the edges of the calendar
/// range the sequence stops at the last week chrono can represent.
pub fn compute_windows(reference_date: NaiveDate, count: usize) -> Vec<AnalysisWindow> {
  let Some(monday) = start_of_week(reference_date) else {
    return Vec::new();
  };

  (0..count)
    .map_while(|i| {
      let start_day = monday.checked_sub_days(Days::new(7 * i as u64))?;
      let start = start_day.and_time(NaiveTime::default());
      let end = start
        .checked_add_signed(chrono::Duration::days(7) - chrono::Duration::seconds(1))?;
      let label = format!(
        "Week {}: {} - {}",
        i + 1,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
      );
      Some(AnalysisWindow { label, start, end })
    })
    .collect()
}

/// Window named `label`, or the most recent one when no label is given.
pub fn select_window<'a>(windows: &'a [AnalysisWindow], label: Option<&str>) -> Result<&'a AnalysisWindow> {
  match label {
    Some(label) => windows
      .iter()
      .find(|w| w.label == label)
      .with_context(|| format!("unknown window '{label}'")),
    None => windows.first().context("no weeks to report on"),
  }
}

/// Parse a `--now-override` string into a local DateTime.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive local timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Local>> {
  s.and_then(|raw| {
    chrono::DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Local))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .and_then(|ndt| ndt.and_local_timezone(Local).single())
      })
  })
}

/// Wall-clock time of `now` in the requested zone.
pub fn now_in_zone(tz: &Tz, now: DateTime<Local>) -> Result<NaiveDateTime> {
  match tz {
    Tz::Local => Ok(now.naive_local()),
    Tz::Utc => Ok(now.with_timezone(&Utc).naive_utc()),
    Tz::Named(name) => {
      let zone: chrono_tz::Tz = name
        .parse()
        .map_err(|e| anyhow::anyhow!("unknown timezone '{name}': {e}"))?;
      Ok(zone.from_utc_datetime(&now.naive_utc()).naive_local())
    }
  }
}

/// Resolve the reference date windows are anchored on.
///
/// `None` means the date of `now`. Otherwise accepts `YYYY-MM-DD`, RFC3339,
/// `YYYY-MM-DDTHH:MM:SS`, relative durations ("2 weeks ago") and natural
/// phrases ("last friday"), all relative to `now`.
pub fn resolve_reference_date(phrase: Option<&str>, now: NaiveDateTime) -> Result<NaiveDate> {
  let raw = match phrase {
    None => return Ok(now.date()),
    Some(p) => p.trim(),
  };

  if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(d);
  }
  if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
    return Ok(dt.naive_local().date());
  }
  if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
    return Ok(ndt.date());
  }

  let phrase = raw.to_lowercase();
  if phrase.is_empty() {
    bail!("empty reference date");
  }
  if phrase == "now" || phrase == "today" {
    return Ok(now.date());
  }

  // Durations first so "2 weeks ago" is not misread by the natural parser
  if let Ok(interval) = parse_duration(&phrase) {
    let shifted = match interval {
      Interval::Seconds(secs) => now + chrono::Duration::seconds(secs.into()),
      Interval::Days(days) => now + chrono::Duration::days(days.into()),
      Interval::Months(months) => shift_months(now, months)?,
    };
    return Ok(shifted.date());
  }

  let config = two_timer::Config::new().now(now);
  let (start, _end, _) = parse_natural(&phrase, Some(config))
    .map_err(|e| anyhow::anyhow!("{e:?}"))
    .with_context(|| format!("could not understand reference date '{raw}'"))?;
  Ok(start.date())
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
  let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
  NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt().map(|d| d.day())
}

fn shift_months(dt: NaiveDateTime, n: i32) -> Result<NaiveDateTime> {
  let total = (dt.year() * 12 + dt.month() as i32 - 1) + n;
  let y = total.div_euclid(12);
  let m = (total.rem_euclid(12) + 1) as u32;
  let last = last_day_of_month(y, m).context("month arithmetic out of range")?;
  let d = dt.day().min(last);
  NaiveDate::from_ymd_opt(y, m, d)
    .and_then(|nd| nd.and_hms_opt(dt.hour(), dt.minute(), dt.second()))
    .context("month arithmetic out of range")
}
