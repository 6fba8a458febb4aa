//! Handlers for `/check-ins` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/check-ins` | Caller's check-ins; optional `addiction_id`, `order` (default `desc`) |
//! | `PUT`  | `/check-ins` | Body: [`UpsertBody`]; insert or overwrite the day's outcome |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use routine_core::{
  check_in::{CheckIn, NewCheckIn},
  store::{RecoveryStore, SortOrder},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub addiction_id: Option<Uuid>,
  #[serde(default)]
  pub order:        SortOrder,
}

/// `GET /check-ins[?addiction_id=<id>][&order=asc|desc]` — ordered by date.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CheckIn>>, ApiError>
where
  S: RecoveryStore + Clone + 'static,
{
  let check_ins = state
    .store
    .list_check_ins(user.identity.user_id, params.addiction_id, params.order)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(check_ins))
}

// ─── Upsert ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /check-ins`.
#[derive(Debug, Deserialize)]
pub struct UpsertBody {
  pub addiction_id:  Uuid,
  /// The caller's calendar day; defaults to the server clock's today.
  pub check_in_date: Option<NaiveDate>,
  pub is_clean:      bool,
  pub notes:         Option<String>,
}

/// `PUT /check-ins` — last write for a given `(addiction_id, date)` wins.
pub async fn upsert<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<UpsertBody>,
) -> Result<Json<CheckIn>, ApiError>
where
  S: RecoveryStore + Clone + 'static,
{
  let user_id = user.identity.user_id;

  // Someone else's addiction is indistinguishable from a missing one.
  state
    .store
    .get_addiction(body.addiction_id)
    .await
    .map_err(ApiError::store)?
    .filter(|a| a.user_id == user_id)
    .ok_or_else(|| {
      ApiError::NotFound(format!("addiction {} not found", body.addiction_id))
    })?;

  let input = NewCheckIn {
    addiction_id:  body.addiction_id,
    user_id,
    check_in_date: body.check_in_date.unwrap_or_else(|| state.clock.today()),
    is_clean:      body.is_clean,
    notes:         body.notes.filter(|n| !n.trim().is_empty()),
  };

  let check_in = state
    .store
    .upsert_check_in(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    addiction_id = %check_in.addiction_id,
    date = %check_in.check_in_date,
    is_clean = check_in.is_clean,
    "check-in recorded"
  );
  Ok(Json(check_in))
}
