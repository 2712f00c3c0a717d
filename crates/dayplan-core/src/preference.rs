//! Preference types, the only persisted entity in dayplan.
//!
//! A preference records one user's availability status for one calendar day.
//! `(user_name, event_date)` is the identity; at most one preference exists
//! per key, and the absence of a row means "no preference recorded".

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::InvalidInput;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The closed set of storable preference values.
///
/// Both variants are opaque markers; adding a variant is a schema change, as
/// the SQLite `CHECK` constraint lists the same strings.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  Display,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PreferenceKind {
  PreferNot,
  No,
}

impl PreferenceKind {
  pub fn parse(s: &str) -> Result<Self, InvalidInput> {
    Self::from_str(s).map_err(|_| InvalidInput::UnknownPreferenceKind(s.to_owned()))
  }
}

// ─── Action ──────────────────────────────────────────────────────────────────

/// What a write request asks for: store a kind, or remove the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceAction {
  Set(PreferenceKind),
  Clear,
}

impl FromStr for PreferenceAction {
  type Err = InvalidInput;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "clear" => Ok(Self::Clear),
      other => PreferenceKind::parse(other).map(Self::Set),
    }
  }
}

// ─── Date ────────────────────────────────────────────────────────────────────

/// A calendar day that always crosses a public boundary as `YYYY-MM-DD`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct EventDate(NaiveDate);

impl EventDate {
  pub const FORMAT: &'static str = "%Y-%m-%d";
}

impl FromStr for EventDate {
  type Err = InvalidInput;

  /// Accepts `YYYY-M-D` with unpadded month and day, but only four-digit
  /// years with no sign or surrounding whitespace.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || InvalidInput::InvalidDate(s.to_owned());
    if !s.starts_with(|c: char| c.is_ascii_digit()) || s.trim() != s {
      return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(s, Self::FORMAT).map_err(|_| invalid())?;
    if !(0..=9999).contains(&date.year()) {
      return Err(invalid());
    }
    Ok(Self(date))
  }
}

impl fmt::Display for EventDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format(Self::FORMAT))
  }
}

impl TryFrom<String> for EventDate {
  type Error = InvalidInput;

  fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<EventDate> for String {
  fn from(d: EventDate) -> Self { d.to_string() }
}

// ─── Preference ──────────────────────────────────────────────────────────────

/// A stored preference, shaped exactly as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
  pub user_name:       String,
  pub event_date:      EventDate,
  pub preference_type: PreferenceKind,
}

/// The identity of a preference, already validated against a roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreferenceKey {
  pub user_name:  String,
  pub event_date: EventDate,
}

impl PreferenceKey {
  pub fn with_kind(self, kind: PreferenceKind) -> Preference {
    Preference {
      user_name:       self.user_name,
      event_date:      self.event_date,
      preference_type: kind,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_wire_names() {
    assert_eq!(PreferenceKind::PreferNot.as_ref(), "prefer_not");
    assert_eq!(PreferenceKind::No.to_string(), "no");
    assert_eq!(PreferenceKind::parse("prefer_not"), Ok(PreferenceKind::PreferNot));
    assert_eq!(PreferenceKind::parse("no"), Ok(PreferenceKind::No));
  }

  #[test]
  fn kind_rejects_unknown_and_case_variants() {
    for bad in ["maybe", "No", "PREFER_NOT", "clear", "", "no "] {
      assert_eq!(
        PreferenceKind::parse(bad),
        Err(InvalidInput::UnknownPreferenceKind(bad.to_owned())),
        "{bad:?}"
      );
    }
  }

  #[test]
  fn action_parses_clear_separately() {
    assert_eq!("clear".parse(), Ok(PreferenceAction::Clear));
    assert_eq!(
      "prefer_not".parse(),
      Ok(PreferenceAction::Set(PreferenceKind::PreferNot))
    );
    assert!("maybe".parse::<PreferenceAction>().is_err());
  }

  #[test]
  fn date_canonical_form() {
    let d: EventDate = "2025-05-15".parse().unwrap();
    assert_eq!(d.to_string(), "2025-05-15");
    assert_eq!(serde_json::to_string(&d).unwrap(), "\"2025-05-15\"");
  }

  #[test]
  fn date_rejects_non_days() {
    for bad in [
      "2025-02-30",
      "15/05/2025",
      "tomorrow",
      "",
      "2025-05-15T00:00:00",
      "-0001-05-15",
      "+2025-05-15",
      " 2025-05-15",
      "2025-05-15 ",
      "12025-05-15",
    ] {
      assert!(bad.parse::<EventDate>().is_err(), "{bad:?}");
    }
  }

  #[test]
  fn preference_json_shape() {
    let p = Preference {
      user_name:       "Jack".into(),
      event_date:      "2025-05-15".parse().unwrap(),
      preference_type: PreferenceKind::PreferNot,
    };
    let v = serde_json::to_value(&p).unwrap();
    assert_eq!(
      v,
      serde_json::json!({
        "user_name": "Jack",
        "event_date": "2025-05-15",
        "preference_type": "prefer_not",
      })
    );
  }
}
