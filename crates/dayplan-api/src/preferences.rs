//! Handlers for `/preferences`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/preferences` | Public; ordered by date, then user |
//! | `POST` | `/preferences` | Admin only; `preference_type` may also be `"clear"` |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::HeaderMap,
};
use dayplan_core::{
  InvalidInput,
  preference::{EventDate, Preference, PreferenceAction},
  store::PreferenceStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::{AppState, auth::RequestCredentials, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /preferences`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Preference>>, ApiError>
where
  S: PreferenceStore + 'static,
{
  let preferences = state.store.list_all().await.map_err(ApiError::from_store)?;
  Ok(Json(preferences))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /preferences`. Every field is checked by hand so
/// a missing field gets its own message.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub user_name:       Option<String>,
  pub event_date:      Option<String>,
  pub preference_type: Option<String>,
}

/// A fully validated write request.
struct Update {
  user_name:  String,
  event_date: EventDate,
  action:     PreferenceAction,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, InvalidInput> {
  value
    .filter(|v| !v.is_empty())
    .ok_or(InvalidInput::MissingField(field))
}

impl<S: PreferenceStore> AppState<S> {
  fn validate(&self, body: UpdateBody) -> Result<Update, InvalidInput> {
    let user_name = required(body.user_name, "user_name")?;
    self.roster.check_user(&user_name)?;
    let event_date = required(body.event_date, "event_date")?.parse()?;
    let action = required(body.preference_type, "preference_type")?.parse()?;
    Ok(Update { user_name, event_date, action })
  }
}

/// `POST /preferences`, body `{"user_name", "event_date", "preference_type"}`.
///
/// Input is validated first, then the gate is consulted; the store is only
/// reached once both pass.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  session: Session,
  headers: HeaderMap,
  body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: PreferenceStore + 'static,
{
  let Json(body) = body.map_err(|_| ApiError::BadRequest("Invalid request body".to_owned()))?;
  let update = state.validate(body)?;

  let creds = RequestCredentials::load(&session, headers).await?;
  if !state.gate.authorize(&creds) {
    tracing::warn!(user = %update.user_name, date = %update.event_date, "write denied");
    return Err(ApiError::Unauthorized);
  }

  let date = update.event_date.to_string();
  let message = match update.action {
    PreferenceAction::Set(kind) => {
      state
        .store
        .upsert(&update.user_name, &date, kind.as_ref())
        .await
        .map_err(ApiError::from_store)?;
      "Preference saved"
    }
    PreferenceAction::Clear => {
      let existed = state
        .store
        .clear(&update.user_name, &date)
        .await
        .map_err(ApiError::from_store)?;
      if existed {
        "Preference cleared"
      } else {
        "Preference not found or already clear"
      }
    }
  };

  Ok(Json(json!({ "status": "success", "message": message })))
}
