//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the handler as `{"status":"error","message":...}` with
//! a status code chosen by variant. Storage and session detail is logged here
//! and never sent to the client.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use dayplan_core::InvalidInput;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("invalid password")]
  InvalidPassword,

  #[error("server misconfigured: {0}")]
  Misconfigured(String),

  #[error("storage unavailable: {0}")]
  Storage(String),

  #[error("session error: {0}")]
  Session(#[from] tower_sessions::session::Error),
}

impl From<InvalidInput> for ApiError {
  fn from(e: InvalidInput) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<dayplan_core::Error> for ApiError {
  fn from(e: dayplan_core::Error) -> Self {
    use dayplan_core::Error as Core;
    match e {
      Core::InvalidInput(invalid) => invalid.into(),
      Core::Unauthorized => Self::Unauthorized,
      Core::StorageUnavailable(detail) => Self::Storage(detail),
      Core::ServerMisconfigured(detail) => Self::Misconfigured(detail),
    }
  }
}

impl ApiError {
  /// Convert any store backend error through the core taxonomy.
  pub fn from_store<E: Into<dayplan_core::Error>>(e: E) -> Self { Self::from(e.into()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        "Unauthorized (edit mode locked)".to_owned(),
      ),
      ApiError::InvalidPassword => (StatusCode::UNAUTHORIZED, "Invalid password".to_owned()),
      ApiError::Misconfigured(m) => {
        tracing::error!(detail = %m, "server misconfigured");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          format!("Server misconfigured: {m}"),
        )
      }
      ApiError::Storage(detail) => {
        tracing::error!(%detail, "storage failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "An internal server error occurred".to_owned(),
        )
      }
      ApiError::Session(e) => {
        tracing::error!(error = %e, "session store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "An internal server error occurred".to_owned(),
        )
      }
    };
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
  }
}
