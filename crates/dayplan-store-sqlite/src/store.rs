//! SQLite implementation of [`PreferenceStore`].

use std::{path::Path, sync::Arc};

use rusqlite::{OptionalExtension as _, TransactionBehavior};

use dayplan_core::{
  preference::Preference,
  roster::Roster,
  store::PreferenceStore,
};

use crate::{Error, Result, encode::RawPreference, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A preference store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Each
/// operation borrows the connection for exactly one closure on the database
/// thread; a transaction left uncommitted on any exit path rolls back when it
/// is dropped.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  roster:          Arc<Roster>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, roster: Roster) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, roster: Arc::new(roster) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory(roster: Roster) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, roster: Arc::new(roster) };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn roster(&self) -> &Roster { &self.roster }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PreferenceStore impl ────────────────────────────────────────────────────

impl PreferenceStore for SqliteStore {
  type Error = Error;

  async fn list_all(&self) -> Result<Vec<Preference>> {
    let raws: Vec<RawPreference> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_name, event_date, preference_type
           FROM preferences
           ORDER BY event_date, user_name",
        )?;
        let rows = stmt
          .query_map([], RawPreference::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPreference::into_preference).collect()
  }

  async fn get(&self, user: &str, date: &str) -> Result<Option<Preference>> {
    let key = self.roster.key(user, date)?;
    let user_name = key.user_name;
    let event_date = key.event_date.to_string();

    let raw: Option<RawPreference> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_name, event_date, preference_type
               FROM preferences
               WHERE user_name = ?1 AND event_date = ?2",
              rusqlite::params![user_name, event_date],
              RawPreference::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPreference::into_preference).transpose()
  }

  async fn upsert(&self, user: &str, date: &str, kind: &str) -> Result<Preference> {
    let preference = self.roster.preference(user, date, kind)?;

    let user_name  = preference.user_name.clone();
    let event_date = preference.event_date.to_string();
    let kind_str   = preference.preference_type.as_ref().to_owned();

    self
      .conn
      .call(move |conn| {
        // Replace-by-delete inside one transaction: readers see either the
        // old row or the new one.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "DELETE FROM preferences WHERE user_name = ?1 AND event_date = ?2",
          rusqlite::params![user_name, event_date],
        )?;
        tx.execute(
          "INSERT INTO preferences (user_name, event_date, preference_type)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_name, event_date, kind_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      user = %preference.user_name,
      date = %preference.event_date,
      kind = %preference.preference_type,
      "preference saved"
    );
    Ok(preference)
  }

  async fn clear(&self, user: &str, date: &str) -> Result<bool> {
    let key = self.roster.key(user, date)?;
    let user_name = key.user_name.clone();
    let event_date = key.event_date.to_string();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM preferences WHERE user_name = ?1 AND event_date = ?2",
          rusqlite::params![user_name, event_date],
        )?)
      })
      .await?;

    tracing::debug!(
      user = %key.user_name,
      date = %key.event_date,
      existed = deleted > 0,
      "preference cleared"
    );
    Ok(deleted > 0)
  }
}
