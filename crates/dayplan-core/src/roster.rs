//! The fixed set of users who may hold preferences, and the validation that
//! turns raw request strings into typed preferences.

use serde::{Deserialize, Serialize};

use crate::{
  InvalidInput,
  preference::{EventDate, Preference, PreferenceKey, PreferenceKind},
};

/// The names used when no roster is configured.
pub const DEFAULT_USERS: [&str; 4] = ["Jack", "Payton", "Nick", "Alyssa"];

/// An ordered, closed list of user names. Matching is exact (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<String>);

impl Default for Roster {
  fn default() -> Self { Self::new(DEFAULT_USERS) }
}

impl Roster {
  pub fn new<I, S>(users: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(users.into_iter().map(Into::into).collect())
  }

  pub fn users(&self) -> &[String] { &self.0 }

  pub fn contains(&self, name: &str) -> bool {
    self.0.iter().any(|u| u == name)
  }

  pub fn check_user(&self, name: &str) -> Result<(), InvalidInput> {
    if self.contains(name) {
      Ok(())
    } else {
      Err(InvalidInput::UnknownUser(name.to_owned()))
    }
  }

  /// Validate a `(user, date)` pair and canonicalise the date.
  pub fn key(&self, user: &str, date: &str) -> Result<PreferenceKey, InvalidInput> {
    self.check_user(user)?;
    Ok(PreferenceKey {
      user_name:  user.to_owned(),
      event_date: date.parse::<EventDate>()?,
    })
  }

  /// Validate a full `(user, date, kind)` triple.
  pub fn preference(
    &self,
    user: &str,
    date: &str,
    kind: &str,
  ) -> Result<Preference, InvalidInput> {
    let key = self.key(user, date)?;
    Ok(key.with_kind(PreferenceKind::parse(kind)?))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_roster() {
    let r = Roster::default();
    assert_eq!(r.users(), &["Jack", "Payton", "Nick", "Alyssa"]);
    assert!(r.contains("Nick"));
    assert!(!r.contains("nick"));
    assert!(!r.contains("NotAUser"));
  }

  #[test]
  fn preference_validates_each_field() {
    let r = Roster::default();

    let ok = r.preference("Jack", "2025-05-15", "prefer_not").unwrap();
    assert_eq!(ok.user_name, "Jack");
    assert_eq!(ok.event_date.to_string(), "2025-05-15");
    assert_eq!(ok.preference_type, PreferenceKind::PreferNot);

    assert_eq!(
      r.preference("NotAUser", "2025-05-15", "no"),
      Err(InvalidInput::UnknownUser("NotAUser".into()))
    );
    assert_eq!(
      r.preference("Jack", "2025-13-01", "no"),
      Err(InvalidInput::InvalidDate("2025-13-01".into()))
    );
    assert_eq!(
      r.preference("Jack", "2025-05-15", "maybe"),
      Err(InvalidInput::UnknownPreferenceKind("maybe".into()))
    );
  }

  #[test]
  fn user_is_checked_before_date() {
    let r = Roster::default();
    assert!(matches!(
      r.key("Nobody", "garbage"),
      Err(InvalidInput::UnknownUser(_))
    ));
  }
}
