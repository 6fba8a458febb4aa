//! Handlers for `/addictions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/addictions` | Caller's addictions; optional `?order=asc\|desc` (default `desc`) |
//! | `POST` | `/addictions` | Body: [`CreateBody`]; returns 201 + stored addiction |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use routine_core::{
  addiction::{Addiction, Color, NewAddiction},
  store::{RecoveryStore, SortOrder},
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub order: SortOrder,
}

/// `GET /addictions[?order=asc|desc]` — ordered by start date.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Addiction>>, ApiError>
where
  S: RecoveryStore + Clone + 'static,
{
  let addictions = state
    .store
    .list_addictions(user.identity.user_id, params.order)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(addictions))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /addictions`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  pub description: Option<String>,
  /// Palette hex string; defaults to green.
  pub color:       Option<String>,
}

/// `POST /addictions` — returns 201 + the stored [`Addiction`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecoveryStore + Clone + 'static,
{
  let color = body
    .color
    .as_deref()
    .map(Color::parse)
    .transpose()?
    .unwrap_or_default();
  let input = NewAddiction::new(
    user.identity.user_id,
    &body.name,
    body.description.as_deref(),
    color,
  )?;

  let addiction = state
    .store
    .add_addiction(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(addiction_id = %addiction.id, "addiction added");
  Ok((StatusCode::CREATED, Json(addiction)))
}
