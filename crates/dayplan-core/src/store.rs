//! The `PreferenceStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `dayplan-store-sqlite`).
//! Higher layers (`dayplan-api`, `dayplan-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::preference::Preference;

/// Abstraction over the authoritative `(user, date) → kind` mapping.
///
/// Inputs arrive as raw strings; every implementation validates them against
/// its roster and reports [`crate::InvalidInput`] without touching storage.
/// Backend errors must convert into [`crate::Error`] so callers can tell
/// invalid input apart from an unavailable store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PreferenceStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Every stored preference, ordered by date, then by user name.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Preference>, Self::Error>> + Send + '_;

  /// The preference at `(user, date)`, if one is recorded.
  fn get<'a>(
    &'a self,
    user: &'a str,
    date: &'a str,
  ) -> impl Future<Output = Result<Option<Preference>, Self::Error>> + Send + 'a;

  /// Create or replace the preference at `(user, date)`.
  ///
  /// Replacement is atomic: no reader ever observes the key with neither the
  /// old nor the new value. Concurrent upserts to one key are last-commit-wins.
  fn upsert<'a>(
    &'a self,
    user: &'a str,
    date: &'a str,
    kind: &'a str,
  ) -> impl Future<Output = Result<Preference, Self::Error>> + Send + 'a;

  /// Remove the preference at `(user, date)`. Returns whether a row existed;
  /// clearing an empty key is a success.
  fn clear<'a>(
    &'a self,
    user: &'a str,
    date: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
