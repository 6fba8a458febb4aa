//! Handler for `GET /dashboard`.
//!
//! Server-side rendition of the dashboard: every addiction with its current
//! and longest streak and today's check-in, computed by
//! [`routine_core::streak::summarize`].

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use routine_core::{
  store::{RecoveryStore, SortOrder},
  streak::{AddictionProgress, summarize},
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct DashboardParams {
  /// The caller's calendar day; defaults to the server clock's today.
  pub today: Option<NaiveDate>,
}

/// `GET /dashboard[?today=YYYY-MM-DD]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<AddictionProgress>>, ApiError>
where
  S: RecoveryStore + Clone + 'static,
{
  let user_id = user.identity.user_id;
  let today = params.today.unwrap_or_else(|| state.clock.today());

  let addictions = state
    .store
    .list_addictions(user_id, SortOrder::Desc)
    .await
    .map_err(ApiError::store)?;
  let check_ins = state
    .store
    .list_check_ins(user_id, None, SortOrder::Desc)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(summarize(&addictions, &check_ins, today)))
}
