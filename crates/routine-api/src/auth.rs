//! Password hashing, session tokens, and the [`CurrentUser`] extractor.
//!
//! Passwords are stored as argon2 PHC strings. A session token is 32 random
//! bytes, base64url-encoded; the store only ever sees its SHA-256 digest.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::Utc;
use rand_core::{OsRng, RngCore};
use routine_core::{identity::Identity, store::RecoveryStore};
use sha2::{Digest, Sha256};

use crate::{AppState, error::ApiError};

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Store(format!("argon2 error: {e}").into()))
}

/// `true` if `password` matches the stored PHC string. A malformed hash
/// never matches.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// A fresh random bearer token.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  B64.encode(bytes)
}

/// The hex SHA-256 digest under which a token is stored.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The identity behind the request's bearer token.
///
/// Present in a handler's arguments means the request carried a live
/// session. The identity is passed into the handler explicitly; nothing
/// about the signed-in user is stored globally.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub identity:   Identity,
  /// Digest of the presented token, kept so sign-out can remove it.
  pub token_hash: String,
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: RecoveryStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
    let token_hash = token_digest(token);

    let identity = state
      .store
      .session_user(&token_hash, Utc::now())
      .await
      .map_err(ApiError::store)?
      .ok_or_else(ApiError::unauthorized)?;

    Ok(CurrentUser { identity, token_hash })
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn password_round_trip() {
    let phc = hash_password("correct horse").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("correct horse", &phc));
    assert!(!verify_password("battery staple", &phc));
  }

  #[test]
  fn malformed_hash_never_verifies() {
    assert!(!verify_password("anything", "not-a-phc-string"));
  }

  #[test]
  fn tokens_are_distinct_and_digest_is_stable() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 43);
    assert_eq!(token_digest(&a), token_digest(&a));
    assert_eq!(token_digest(&a).len(), 64);
    assert_ne!(token_digest(&a), token_digest(&b));
  }

  #[test]
  fn bearer_token_parsing() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok123"));
    assert_eq!(bearer_token(&headers), Some("tok123"));
  }
}
