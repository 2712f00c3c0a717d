//! Handler for `GET /calendar`: the read model a calendar view renders from.

use axum::{Json, extract::State};
use dayplan_core::{
  calendar::{MonthGrid, PreferenceGrid, group_by_date},
  store::PreferenceStore,
};
use serde::Serialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct CalendarView {
  pub users:       Vec<String>,
  pub months:      Vec<MonthGrid>,
  pub preferences: PreferenceGrid,
}

/// `GET /calendar`
pub async fn view<S>(State(state): State<AppState<S>>) -> Result<Json<CalendarView>, ApiError>
where
  S: PreferenceStore + 'static,
{
  let preferences = state.store.list_all().await.map_err(ApiError::from_store)?;

  Ok(Json(CalendarView {
    users:       state.roster.users().to_vec(),
    months:      state.window.grids(),
    preferences: group_by_date(preferences),
  }))
}
