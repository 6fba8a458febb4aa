//! Handlers for `/auth` endpoints — the identity provider.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/sign-up` | Body: [`Credentials`]; returns 201 + [`Session`] |
//! | `POST` | `/auth/sign-in` | Body: [`Credentials`]; returns [`Session`] |
//! | `GET`  | `/auth/session` | The caller's [`Identity`] |
//! | `POST` | `/auth/sign-out` | 204; the presented token stops working |

use std::fmt;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use routine_core::{
  identity::{Identity, Session, normalize_email},
  store::RecoveryStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::{CurrentUser, generate_token, hash_password, token_digest, verify_password},
  error::ApiError,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("email", &self.email)
      .field("password", &"<redacted>")
      .finish()
  }
}

impl Credentials {
  fn validate(&self) -> Result<(), ApiError> {
    let email = normalize_email(&self.email);
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
      return Err(ApiError::BadRequest(format!("invalid email address: {email:?}")));
    }
    if self.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(ApiError::BadRequest(format!(
        "password must be at least {MIN_PASSWORD_LEN} characters"
      )));
    }
    Ok(())
  }
}

/// Mint a token for `user`, persist its digest, and hand back the session.
async fn open_session<S: RecoveryStore>(
  state: &AppState<S>,
  user: Identity,
) -> Result<Session, ApiError> {
  let token = generate_token();
  let expires_at = Utc::now()
    .checked_add_signed(state.session_ttl)
    .ok_or_else(|| ApiError::Store("session lifetime out of range".into()))?;
  state
    .store
    .create_session(user.user_id, &token_digest(&token), expires_at)
    .await
    .map_err(ApiError::store)?;
  Ok(Session { token, user })
}

// ─── Sign up ──────────────────────────────────────────────────────────────────

/// `POST /auth/sign-up` — registers and signs in in one step.
pub async fn sign_up<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecoveryStore + Clone + 'static,
{
  body.validate()?;
  let taken = || {
    ApiError::Conflict(format!(
      "an account with email {:?} already exists",
      normalize_email(&body.email)
    ))
  };

  // Skips hashing for the common case; the insert below is authoritative.
  if state
    .store
    .find_user_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(taken());
  }

  let password = body.password.clone();
  let phc = tokio::task::spawn_blocking(move || hash_password(&password))
    .await
    .map_err(ApiError::store)??;

  let user = state
    .store
    .create_user(&body.email, &phc)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(taken)?;
  tracing::info!(user_id = %user.user_id, "user signed up");

  let session = open_session(&state, user).await?;
  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Sign in ──────────────────────────────────────────────────────────────────

/// `POST /auth/sign-in`
pub async fn sign_in<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<Credentials>,
) -> Result<Json<Session>, ApiError>
where
  S: RecoveryStore + Clone + 'static,
{
  let invalid = || ApiError::Unauthorized("invalid login credentials".into());

  let Some((user, phc)) = state
    .store
    .find_user_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
  else {
    tracing::info!("sign-in rejected: unknown email");
    return Err(invalid());
  };

  let password = body.password;
  let ok = tokio::task::spawn_blocking(move || verify_password(&password, &phc))
    .await
    .map_err(ApiError::store)?;
  if !ok {
    tracing::info!(user_id = %user.user_id, "sign-in rejected: wrong password");
    return Err(invalid());
  }

  let session = open_session(&state, user).await?;
  Ok(Json(session))
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// `GET /auth/session`
pub async fn session(user: CurrentUser) -> Json<Identity> { Json(user.identity) }

// ─── Sign out ─────────────────────────────────────────────────────────────────

/// `POST /auth/sign-out`
pub async fn sign_out<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<StatusCode, ApiError>
where
  S: RecoveryStore + Clone + 'static,
{
  state
    .store
    .delete_session(&user.token_hash)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(user_id = %user.identity.user_id, "signed out");
  Ok(StatusCode::NO_CONTENT)
}
