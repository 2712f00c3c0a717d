//! The calendar window that preferences are collected over, and the read
//! model the view layer renders from.

use std::collections::BTreeMap;

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  preference::{EventDate, Preference, PreferenceKind},
};

// ─── Window ──────────────────────────────────────────────────────────────────

/// A run of consecutive calendar months, e.g. May–August 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarWindow {
  year:        i32,
  first_month: u32,
  months:      u32,
}

impl Default for CalendarWindow {
  fn default() -> Self { Self { year: 2025, first_month: 5, months: 4 } }
}

impl CalendarWindow {
  pub fn new(year: i32, first_month: u32, months: u32) -> Result<Self> {
    let window = Self { year, first_month, months };
    if !(1..=12).contains(&first_month) {
      return Err(Error::ServerMisconfigured(format!(
        "calendar first month must be 1-12, got {first_month}"
      )));
    }
    if months == 0 || window.month_start(months - 1).is_none() {
      return Err(Error::ServerMisconfigured(format!(
        "calendar window of {months} months from {year}-{first_month:02} is not representable"
      )));
    }
    Ok(window)
  }

  /// First day of the `offset`-th month of the window.
  fn month_start(&self, offset: u32) -> Option<NaiveDate> {
    let index = i64::from(self.first_month - 1) + i64::from(offset);
    let year = i32::try_from(i64::from(self.year) + index / 12).ok()?;
    let month = u32::try_from(index % 12).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
  }

  /// One grid per month, in order.
  pub fn grids(&self) -> Vec<MonthGrid> {
    (0..self.months)
      .filter_map(|offset| self.month_start(offset))
      .map(MonthGrid::for_month)
      .collect()
  }
}

// ─── Month grid ──────────────────────────────────────────────────────────────

/// A month laid out as Monday-first weeks. Cells outside the month are `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
  pub year:       i32,
  pub month:      u32,
  pub month_name: String,
  pub days:       Vec<u32>,
  pub weeks:      Vec<[u32; 7]>,
}

impl MonthGrid {
  fn for_month(first: NaiveDate) -> Self {
    let days: Vec<u32> = first
      .iter_days()
      .take_while(|d| d.month() == first.month())
      .map(|d| d.day())
      .collect();

    let lead = first.weekday().num_days_from_monday() as usize;
    let mut cells = vec![0; lead];
    cells.extend(&days);
    cells.resize(cells.len().div_ceil(7) * 7, 0);

    let weeks = cells
      .chunks_exact(7)
      .map(|w| [w[0], w[1], w[2], w[3], w[4], w[5], w[6]])
      .collect();

    let month_name = u8::try_from(first.month())
      .ok()
      .and_then(|m| Month::try_from(m).ok())
      .map(|m| m.name().to_owned())
      .unwrap_or_default();

    Self {
      year: first.year(),
      month: first.month(),
      month_name,
      days,
      weeks,
    }
  }
}

// ─── Grouped preferences ─────────────────────────────────────────────────────

/// `date → user → kind`, the lookup shape a calendar cell needs.
pub type PreferenceGrid = BTreeMap<EventDate, BTreeMap<String, PreferenceKind>>;

pub fn group_by_date(preferences: impl IntoIterator<Item = Preference>) -> PreferenceGrid {
  let mut grid = PreferenceGrid::new();
  for p in preferences {
    grid
      .entry(p.event_date)
      .or_default()
      .insert(p.user_name, p.preference_type);
  }
  grid
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_window_is_may_through_august_2025() {
    let grids = CalendarWindow::default().grids();
    let names: Vec<_> = grids.iter().map(|g| g.month_name.as_str()).collect();
    assert_eq!(names, ["May", "June", "July", "August"]);
    assert!(grids.iter().all(|g| g.year == 2025));
  }

  #[test]
  fn may_2025_layout() {
    // 1 May 2025 is a Thursday.
    let may = &CalendarWindow::default().grids()[0];
    assert_eq!(may.days.len(), 31);
    assert_eq!(may.weeks[0], [0, 0, 0, 1, 2, 3, 4]);
    assert_eq!(may.weeks.last().unwrap(), &[26, 27, 28, 29, 30, 31, 0]);
    assert_eq!(may.weeks.len(), 5);
  }

  #[test]
  fn window_rolls_over_the_year() {
    let w = CalendarWindow::new(2025, 11, 4).unwrap();
    let ym: Vec<_> = w.grids().iter().map(|g| (g.year, g.month)).collect();
    assert_eq!(ym, [(2025, 11), (2025, 12), (2026, 1), (2026, 2)]);
    assert_eq!(w.grids()[3].days.len(), 28);
  }

  #[test]
  fn invalid_windows_are_rejected() {
    assert!(CalendarWindow::new(2025, 0, 4).is_err());
    assert!(CalendarWindow::new(2025, 13, 4).is_err());
    assert!(CalendarWindow::new(2025, 5, 0).is_err());
  }

  #[test]
  fn grouping() {
    let p = |u: &str, d: &str, k| Preference {
      user_name:       u.into(),
      event_date:      d.parse().unwrap(),
      preference_type: k,
    };
    let grid = group_by_date([
      p("Jack", "2025-05-15", PreferenceKind::PreferNot),
      p("Nick", "2025-05-15", PreferenceKind::No),
      p("Jack", "2025-06-01", PreferenceKind::No),
    ]);
    assert_eq!(grid.len(), 2);
    let may15 = &grid[&"2025-05-15".parse::<EventDate>().unwrap()];
    assert_eq!(may15["Jack"], PreferenceKind::PreferNot);
    assert_eq!(may15["Nick"], PreferenceKind::No);

    let json = serde_json::to_value(&grid).unwrap();
    assert_eq!(json["2025-06-01"]["Jack"], "no");
  }
}
