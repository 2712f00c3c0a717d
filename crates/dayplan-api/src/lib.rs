//! JSON API for dayplan.
//!
//! Exposes an axum [`Router`] backed by any
//! [`dayplan_core::store::PreferenceStore`]. Reads are public; writes pass
//! through the [`auth::Gate`]. The router expects a
//! [`tower_sessions::SessionManagerLayer`] to be applied by the caller; TLS
//! and transport concerns are the caller's responsibility too.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dayplan_api::api_router(state))
//! ```

pub mod auth;
pub mod calendar;
pub mod error;
pub mod preferences;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use dayplan_core::{calendar::CalendarWindow, roster::Roster, store::PreferenceStore};

pub use error::ApiError;

use auth::Gate;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub gate:   Arc<Gate>,
  pub roster: Arc<Roster>,
  pub window: CalendarWindow,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      gate:   Arc::clone(&self.gate),
      roster: Arc::clone(&self.roster),
      window: self.window,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: PreferenceStore + 'static,
{
  Router::new()
    .route(
      "/preferences",
      get(preferences::list::<S>).post(preferences::update::<S>),
    )
    .route("/calendar", get(calendar::view::<S>))
    .route("/auth/status", get(auth::status))
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/logout", post(auth::logout::<S>))
    .with_state(state)
}
