//! Error type for `dayplan-store-sqlite`.

use dayplan_core::InvalidInput;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Invalid(#[from] InvalidInput),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A row that violates the schema's own constraints was read back.
  #[error("corrupt row: {0}")]
  CorruptRow(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for dayplan_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Invalid(invalid) => Self::InvalidInput(invalid),
      other => Self::StorageUnavailable(other.to_string()),
    }
  }
}
