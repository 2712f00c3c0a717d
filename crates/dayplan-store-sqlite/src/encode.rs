//! Decoding helpers between the plain-text columns in SQLite and the domain
//! types in `dayplan-core`.
//!
//! Dates are stored in their canonical `YYYY-MM-DD` form, and kinds as their
//! snake_case wire names, so encoding is just `to_string()`.

use dayplan_core::preference::{EventDate, Preference, PreferenceKind};

use crate::{Error, Result};

/// Raw strings read directly from a `preferences` row.
pub struct RawPreference {
  pub user_name:       String,
  pub event_date:      String,
  pub preference_type: String,
}

impl RawPreference {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_name:       row.get(0)?,
      event_date:      row.get(1)?,
      preference_type: row.get(2)?,
    })
  }

  pub fn into_preference(self) -> Result<Preference> {
    let event_date = self
      .event_date
      .parse::<EventDate>()
      .map_err(|e| Error::CorruptRow(e.to_string()))?;
    let preference_type = PreferenceKind::parse(&self.preference_type)
      .map_err(|e| Error::CorruptRow(e.to_string()))?;

    Ok(Preference {
      user_name: self.user_name,
      event_date,
      preference_type,
    })
  }
}
