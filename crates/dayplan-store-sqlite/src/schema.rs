//! SQL schema for the dayplan SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision; changing the set of preference kinds bumps it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per (user, day). Absence of a row means no preference.
CREATE TABLE IF NOT EXISTS preferences (
    user_name       TEXT NOT NULL,
    event_date      TEXT NOT NULL,   -- YYYY-MM-DD
    preference_type TEXT NOT NULL
                    CHECK (preference_type IN ('prefer_not', 'no')),
    PRIMARY KEY (user_name, event_date)
);

CREATE INDEX IF NOT EXISTS preferences_date_idx ON preferences(event_date, user_name);

PRAGMA user_version = 1;
";
