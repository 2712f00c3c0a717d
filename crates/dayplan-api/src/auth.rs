//! Request credentials, the HTTP credential sources, and the `/auth` handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/auth/status` | `{"is_admin": bool}` for the calling session |
//! | `POST` | `/auth/login`  | Body `{"password":"..."}`, or header / Basic fallback |
//! | `POST` | `/auth/logout` | Always 200 |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::{HeaderMap, header},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use dayplan_core::{
  gate::{AccessGate, AdminSession, Credential, CredentialSource, HasAdminSession, Secret, SessionFlag},
  store::PreferenceStore,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::{AppState, error::ApiError};

/// Session key holding the serialised [`AdminSession`].
pub const ADMIN_SESSION_KEY: &str = "dayplan.admin";

/// Header carrying a plaintext admin password, for scripted clients.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

// ─── Request credentials ─────────────────────────────────────────────────────

/// Everything a request can present to the gate.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
  pub session: AdminSession,
  pub headers: HeaderMap,
}

impl RequestCredentials {
  pub async fn load(session: &Session, headers: HeaderMap) -> Result<Self, ApiError> {
    Ok(Self { session: admin_session(session).await?, headers })
  }
}

impl HasAdminSession for RequestCredentials {
  fn admin_session(&self) -> AdminSession { self.session }
}

/// The gate type used by the HTTP layer.
pub type Gate = AccessGate<RequestCredentials>;

/// Session flag, then `X-Admin-Password`, then HTTP Basic.
pub fn http_gate(secret: Option<Secret>) -> Gate {
  AccessGate::new(secret)
    .with_source(SessionFlag)
    .with_source(HeaderPassword)
    .with_source(BasicPassword)
}

async fn admin_session(session: &Session) -> Result<AdminSession, ApiError> {
  Ok(
    session
      .get::<AdminSession>(ADMIN_SESSION_KEY)
      .await?
      .unwrap_or_default(),
  )
}

// ─── Credential sources ──────────────────────────────────────────────────────

/// `X-Admin-Password: <password>`
#[derive(Debug, Clone, Copy)]
pub struct HeaderPassword;

impl CredentialSource<RequestCredentials> for HeaderPassword {
  fn extract(&self, request: &RequestCredentials) -> Option<Credential> {
    request
      .headers
      .get(ADMIN_PASSWORD_HEADER)
      .and_then(|v| v.to_str().ok())
      .filter(|p| !p.is_empty())
      .map(|p| Credential::Password(p.to_owned()))
  }
}

/// `Authorization: Basic base64(<any user>:<password>)`; the username is ignored.
#[derive(Debug, Clone, Copy)]
pub struct BasicPassword;

impl CredentialSource<RequestCredentials> for BasicPassword {
  fn extract(&self, request: &RequestCredentials) -> Option<Credential> {
    let encoded = request
      .headers
      .get(header::AUTHORIZATION)?
      .to_str()
      .ok()?
      .strip_prefix("Basic ")?;

    let decoded = B64.decode(encoded.trim()).ok()?;
    let creds = String::from_utf8(decoded).ok()?;
    let (_user, password) = creds.split_once(':')?;

    (!password.is_empty()).then(|| Credential::Password(password.to_owned()))
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatus {
  pub is_admin: bool,
}

/// `GET /auth/status`
pub async fn status(session: Session) -> Result<Json<AuthStatus>, ApiError> {
  let admin = admin_session(&session).await?;
  Ok(Json(AuthStatus { is_admin: admin.is_admin() }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  pub password: Option<String>,
}

/// `POST /auth/login` with body `{"password":"..."}`.
///
/// Without a body password, the first password found in `X-Admin-Password` or
/// HTTP Basic is tried instead.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  session: Session,
  headers: HeaderMap,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: PreferenceStore + 'static,
{
  let creds = RequestCredentials::load(&session, headers).await?;
  let provided = body
    .ok()
    .and_then(|Json(b)| b.password)
    .filter(|p| !p.is_empty())
    .or_else(|| state.gate.presented_password(&creds));

  let mut admin = creds.session;
  if !state.gate.login(&mut admin, provided.as_deref())? {
    tracing::warn!("admin login rejected");
    return Err(ApiError::InvalidPassword);
  }

  session.cycle_id().await?;
  session.insert(ADMIN_SESSION_KEY, admin).await?;
  tracing::info!("admin session unlocked");

  Ok(Json(json!({
    "status": "success",
    "message": "Unlocked. Edit mode enabled.",
  })))
}

/// `POST /auth/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  session: Session,
) -> Result<Json<Value>, ApiError>
where
  S: PreferenceStore + 'static,
{
  let mut admin = admin_session(&session).await?;
  state.gate.logout(&mut admin);
  session.insert(ADMIN_SESSION_KEY, admin).await?;
  tracing::info!("admin session locked");

  Ok(Json(json!({
    "status": "success",
    "message": "Locked. Edit mode disabled.",
  })))
}
