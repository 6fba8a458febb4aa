//! The `RecoveryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `routine-store-sqlite`).
//! Higher layers (`routine-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  addiction::{Addiction, NewAddiction},
  check_in::{CheckIn, NewCheckIn},
  identity::Identity,
};

/// Result ordering for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  #[serde(alias = "ascending")]
  Asc,
  #[default]
  #[serde(alias = "descending")]
  Desc,
}

impl SortOrder {
  pub fn as_sql(self) -> &'static str {
    match self {
      Self::Asc => "ASC",
      Self::Desc => "DESC",
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Reset Routine storage backend.
///
/// Holds users, sessions, addictions and check-ins. Password and token
/// material arrives already hashed; the store never sees a secret.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecoveryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users & sessions ──────────────────────────────────────────────────

  /// Register a user. The email is normalised before storage. Returns
  /// `None` if an account with that email already exists.
  fn create_user<'a>(
    &'a self,
    email: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + 'a;

  /// Look up a user and their password hash by (normalised) email.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<(Identity, String)>, Self::Error>> + Send + 'a;

  /// Persist a session keyed by the digest of its bearer token.
  fn create_session<'a>(
    &'a self,
    user_id: Uuid,
    token_hash: &'a str,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Resolve a token digest to its identity. Expired sessions (relative to
  /// `now`) resolve to `None`.
  fn session_user<'a>(
    &'a self,
    token_hash: &'a str,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + 'a;

  /// Remove a session. Returns `false` if no such session existed.
  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Addictions ────────────────────────────────────────────────────────

  /// Persist a new addiction. `id` and `start_date` are set by the store.
  fn add_addiction(
    &self,
    input: NewAddiction,
  ) -> impl Future<Output = Result<Addiction, Self::Error>> + Send + '_;

  /// Retrieve an addiction by id. Returns `None` if not found.
  fn get_addiction(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Addiction>, Self::Error>> + Send + '_;

  /// All addictions owned by `user_id`, ordered by `start_date`.
  fn list_addictions(
    &self,
    user_id: Uuid,
    order: SortOrder,
  ) -> impl Future<Output = Result<Vec<Addiction>, Self::Error>> + Send + '_;

  // ── Check-ins ─────────────────────────────────────────────────────────

  /// Insert a check-in, or overwrite the outcome and notes of the existing
  /// one for the same `(addiction_id, check_in_date)`. Returns the stored
  /// row; an overwritten row keeps its original id.
  fn upsert_check_in(
    &self,
    input: NewCheckIn,
  ) -> impl Future<Output = Result<CheckIn, Self::Error>> + Send + '_;

  /// Check-ins owned by `user_id`, optionally restricted to one addiction,
  /// ordered by `check_in_date`.
  fn list_check_ins(
    &self,
    user_id: Uuid,
    addiction_id: Option<Uuid>,
    order: SortOrder,
  ) -> impl Future<Output = Result<Vec<CheckIn>, Self::Error>> + Send + '_;
}
