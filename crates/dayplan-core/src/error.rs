//! Error types for `dayplan-core`.
//!
//! [`Error`] is the taxonomy every layer reports in. Backends translate their
//! own failures into it at the store boundary, and the HTTP layer maps each
//! variant to exactly one status code.

use thiserror::Error;

/// Client-supplied data that failed validation. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
  #[error("unknown user: {0:?}")]
  UnknownUser(String),

  #[error("not a calendar date (expected YYYY-MM-DD): {0:?}")]
  InvalidDate(String),

  #[error("unknown preference type: {0:?}")]
  UnknownPreferenceKind(String),

  #[error("missing field: {0}")]
  MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(#[from] InvalidInput),

  #[error("unauthorized")]
  Unauthorized,

  /// The backing store could not be reached or a transaction failed.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(String),

  /// The deployment is broken (e.g. no admin secret configured), as opposed
  /// to the caller presenting bad credentials.
  #[error("server misconfigured: {0}")]
  ServerMisconfigured(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
