//! The dayplan HTTP server: configuration, session handling and the outer
//! router that mounts the JSON API under `/api`.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use dayplan_api::{AppState, auth::http_gate};
use dayplan_core::{
  Error,
  calendar::CalendarWindow,
  gate::Secret,
  roster::{DEFAULT_USERS, Roster},
  store::PreferenceStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tower_sessions::{
  Expiry, MemoryStore, SessionManagerLayer,
  cookie::{SameSite, time::Duration},
};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "dayplan_session";

/// Upper bound for `session_ttl_hours`: ten years.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `dayplan.toml` and
/// `DAYPLAN_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_database_path")]
  pub database_path:        PathBuf,
  /// Plaintext shared secret.
  #[serde(default)]
  pub admin_password:       Option<String>,
  /// argon2 PHC string; wins over `admin_password` when both are set.
  #[serde(default)]
  pub admin_password_hash:  Option<String>,
  #[serde(default = "default_users")]
  pub users:                Vec<String>,
  #[serde(default = "default_calendar_year")]
  pub calendar_year:        i32,
  #[serde(default = "default_calendar_first_month")]
  pub calendar_first_month: u32,
  #[serde(default = "default_calendar_months")]
  pub calendar_months:      u32,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours:    i64,
  #[serde(default)]
  pub secure_cookies:       bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_database_path() -> PathBuf { PathBuf::from("dayplan.sqlite3") }
fn default_users() -> Vec<String> { DEFAULT_USERS.map(String::from).to_vec() }
fn default_calendar_year() -> i32 { 2025 }
fn default_calendar_first_month() -> u32 { 5 }
fn default_calendar_months() -> u32 { 4 }
fn default_session_ttl_hours() -> i64 { 24 }

impl ServerConfig {
  /// The configured admin secret, if any. Empty values count as unset.
  pub fn secret(&self) -> dayplan_core::Result<Option<Secret>> {
    if let Some(hash) = self.admin_password_hash.as_deref().filter(|h| !h.is_empty()) {
      return Secret::argon2(hash).map(Some);
    }
    Ok(
      self
        .admin_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(Secret::plain),
    )
  }

  pub fn roster(&self) -> Roster { Roster::new(self.users.iter().cloned()) }

  pub fn window(&self) -> dayplan_core::Result<CalendarWindow> {
    CalendarWindow::new(
      self.calendar_year,
      self.calendar_first_month,
      self.calendar_months,
    )
  }

  /// Inactivity timeout for admin sessions. Must be between one hour and
  /// ten years.
  pub fn session_ttl(&self) -> dayplan_core::Result<Duration> {
    let hours = self.session_ttl_hours;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
      return Err(Error::ServerMisconfigured(format!(
        "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}"
      )));
    }
    hours
      .checked_mul(3600)
      .map(Duration::seconds)
      .ok_or_else(|| Error::ServerMisconfigured(format!("session_ttl_hours out of range: {hours}")))
  }

  /// Assemble handler state around an opened store.
  pub fn app_state<S: PreferenceStore>(&self, store: S) -> dayplan_core::Result<AppState<S>> {
    let gate = http_gate(self.secret()?);
    if !gate.is_configured() {
      tracing::warn!("no admin password configured; edit mode cannot be unlocked");
    }
    Ok(AppState {
      store:  Arc::new(store),
      gate:   Arc::new(gate),
      roster: Arc::new(self.roster()),
      window: self.window()?,
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// In-memory sessions: `HttpOnly`, `SameSite=Strict`, expiring after `ttl`
/// of inactivity.
pub fn session_layer(ttl: Duration, secure: bool) -> SessionManagerLayer<MemoryStore> {
  SessionManagerLayer::new(MemoryStore::default())
    .with_name(SESSION_COOKIE_NAME)
    .with_expiry(Expiry::OnInactivity(ttl))
    .with_secure(secure)
    .with_same_site(SameSite::Strict)
    .with_http_only(true)
    .with_path("/")
}

/// The complete application: `/api/*` behind sessions and request tracing.
///
/// Fails with [`Error::ServerMisconfigured`] on an unusable session TTL.
pub fn router<S>(state: AppState<S>, config: &ServerConfig) -> dayplan_core::Result<Router>
where
  S: PreferenceStore + 'static,
{
  let sessions = session_layer(config.session_ttl()?, config.secure_cookies);
  Ok(mount(state, sessions))
}

pub(crate) fn mount<S>(state: AppState<S>, sessions: SessionManagerLayer<MemoryStore>) -> Router
where
  S: PreferenceStore + 'static,
{
  Router::new()
    .nest("/api", dayplan_api::api_router(state))
    .layer(sessions)
    .layer(TraceLayer::new_for_http())
}
