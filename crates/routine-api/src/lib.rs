//! JSON REST API for Reset Routine.
//!
//! Exposes an axum [`Router`] backed by any
//! [`routine_core::store::RecoveryStore`]: the identity provider (sign-up,
//! sign-in, session, sign-out) and the addiction / check-in records of the
//! signed-in user. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", routine_api::api_router(AppState::new(store)))
//! ```

pub mod accounts;
pub mod addictions;
pub mod auth;
pub mod check_ins;
pub mod dashboard;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::TimeDelta;
use routine_core::{
  clock::{Clock, SystemClock},
  store::RecoveryStore,
};

pub use error::ApiError;

/// Default lifetime of a session token.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 720;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:       Arc<S>,
  /// Resolves "today" when a request doesn't name its own calendar day.
  pub clock:       Arc<dyn Clock>,
  pub session_ttl: TimeDelta,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      clock: Arc::new(SystemClock),
      session_ttl: TimeDelta::hours(DEFAULT_SESSION_TTL_HOURS),
    }
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn with_session_ttl(mut self, ttl: TimeDelta) -> Self {
    self.session_ttl = ttl;
    self
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RecoveryStore + Clone + 'static,
{
  Router::new()
    // Identity
    .route("/auth/sign-up", post(accounts::sign_up::<S>))
    .route("/auth/sign-in", post(accounts::sign_in::<S>))
    .route("/auth/session", get(accounts::session))
    .route("/auth/sign-out", post(accounts::sign_out::<S>))
    // Records
    .route(
      "/addictions",
      get(addictions::list::<S>).post(addictions::create::<S>),
    )
    .route(
      "/check-ins",
      get(check_ins::list::<S>).put(check_ins::upsert::<S>),
    )
    .route("/dashboard", get(dashboard::handler::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::NaiveDate;
  use routine_core::clock::FixedClock;
  use routine_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  const TODAY: &str = "2024-05-10";

  async fn make_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let today: NaiveDate = TODAY.parse().unwrap();
    api_router(AppState::new(Arc::new(store)).with_clock(FixedClock(today)))
  }

  async fn send(
    app:    &Router,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn sign_up(app: &Router, email: &str) -> String {
    let (status, body) = send(
      app,
      "POST",
      "/auth/sign-up",
      None,
      Some(json!({ "email": email, "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_owned()
  }

  async fn add(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
      app,
      "POST",
      "/addictions",
      Some(token),
      Some(json!({ "name": name, "color": "#3b82f6" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_owned()
  }

  // ── Identity ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sign_up_sign_in_and_sign_out() {
    let app = make_app().await;
    let first = sign_up(&app, "Alice@Example.com").await;

    let (status, me) = send(&app, "GET", "/auth/session", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");

    let (status, body) = send(
      &app,
      "POST",
      "/auth/sign-in",
      None,
      Some(json!({ "email": "alice@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second = body["token"].as_str().unwrap().to_owned();
    assert_ne!(first, second);
    assert_eq!(body["user"]["user_id"], me["user_id"]);

    let (status, _) = send(&app, "POST", "/auth/sign-out", Some(&first), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/auth/session", Some(&first), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    // The other session is unaffected.
    let (status, _) = send(&app, "GET", "/auth/session", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn sign_in_with_wrong_password_is_rejected() {
    let app = make_app().await;
    sign_up(&app, "bob@example.com").await;

    let (status, body) = send(
      &app,
      "POST",
      "/auth/sign-in",
      None,
      Some(json!({ "email": "bob@example.com", "password": "nope-nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid login credentials");
  }

  #[tokio::test]
  async fn duplicate_and_invalid_sign_ups() {
    let app = make_app().await;
    sign_up(&app, "carol@example.com").await;

    let (status, _) = send(
      &app,
      "POST",
      "/auth/sign-up",
      None,
      Some(json!({ "email": " CAROL@example.com", "password": "whatever1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
      &app,
      "POST",
      "/auth/sign-up",
      None,
      Some(json!({ "email": "no-at-sign", "password": "whatever1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
      &app,
      "POST",
      "/auth/sign-up",
      None,
      Some(json!({ "email": "dave@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
  async fn concurrent_sign_ups_with_one_email_conflict() {
    let app = make_app().await;
    let body = json!({ "email": "race@example.com", "password": "hunter22" });

    let (a, b) = tokio::join!(
      send(&app, "POST", "/auth/sign-up", None, Some(body.clone())),
      send(&app, "POST", "/auth/sign-up", None, Some(body)),
    );
    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT], "{} / {}", a.1, b.1);
  }

  #[tokio::test]
  async fn out_of_range_session_lifetime_is_an_error_not_a_panic() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = api_router(
      AppState::new(Arc::new(store)).with_session_ttl(TimeDelta::hours(3_000_000_000)),
    );

    let (status, body) = send(
      &app,
      "POST",
      "/auth/sign-up",
      None,
      Some(json!({ "email": "ttl@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("session lifetime"));
  }

  #[tokio::test]
  async fn records_require_a_session() {
    let app = make_app().await;
    for uri in ["/addictions", "/check-ins", "/dashboard"] {
      let (status, _) = send(&app, "GET", uri, None, None).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
      let (status, _) = send(&app, "GET", uri, Some("bogus"), None).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
  }

  // ── Addictions ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_addiction_validates_input() {
    let app = make_app().await;
    let token = sign_up(&app, "erin@example.com").await;

    let (status, body) = send(
      &app,
      "POST",
      "/addictions",
      Some(&token),
      Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (status, _) = send(
      &app,
      "POST",
      "/addictions",
      Some(&token),
      Some(json!({ "name": "Sugar", "color": "#123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
      &app,
      "POST",
      "/addictions",
      Some(&token),
      Some(json!({ "name": " Sugar ", "description": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Sugar");
    assert_eq!(body["color"], "#22c55e");
    assert!(body["description"].is_null());
  }

  #[tokio::test]
  async fn users_only_see_their_own_records() {
    let app = make_app().await;
    let alice = sign_up(&app, "alice@example.com").await;
    let mallory = sign_up(&app, "mallory@example.com").await;
    let smoking = add(&app, &alice, "Smoking").await;

    let (_, list) = send(&app, "GET", "/addictions", Some(&mallory), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);

    let (status, _) = send(
      &app,
      "PUT",
      "/check-ins",
      Some(&mallory),
      Some(json!({ "addiction_id": smoking, "is_clean": false })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, "GET", "/check-ins", Some(&alice), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
  }

  // ── Check-ins & dashboard ─────────────────────────────────────────────────

  #[tokio::test]
  async fn check_in_defaults_to_clock_today_and_upserts() {
    let app = make_app().await;
    let token = sign_up(&app, "frank@example.com").await;
    let smoking = add(&app, &token, "Smoking").await;

    let (status, first) = send(
      &app,
      "PUT",
      "/check-ins",
      Some(&token),
      Some(json!({ "addiction_id": smoking, "is_clean": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["check_in_date"], TODAY);

    let (_, second) = send(
      &app,
      "PUT",
      "/check-ins",
      Some(&token),
      Some(json!({ "addiction_id": smoking, "is_clean": false, "check_in_date": TODAY })),
    )
    .await;
    assert_eq!(second["id"], first["id"]);

    let (_, list) = send(
      &app,
      "GET",
      &format!("/check-ins?addiction_id={smoking}"),
      Some(&token),
      None,
    )
    .await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["is_clean"], false);
  }

  #[tokio::test]
  async fn dashboard_reports_streaks() {
    let app = make_app().await;
    let token = sign_up(&app, "grace@example.com").await;
    let smoking = add(&app, &token, "Smoking").await;

    for date in ["2024-05-06", "2024-05-07", "2024-05-08", "2024-05-09"] {
      let (status, _) = send(
        &app,
        "PUT",
        "/check-ins",
        Some(&token),
        Some(json!({ "addiction_id": smoking, "is_clean": true, "check_in_date": date })),
      )
      .await;
      assert_eq!(status, StatusCode::OK);
    }

    let (_, cards) =
      send(&app, "GET", "/dashboard?today=2024-05-09", Some(&token), None).await;
    assert_eq!(cards[0]["current_streak"], 4);
    assert_eq!(cards[0]["longest_streak"], 4);
    assert_eq!(cards[0]["today"]["is_clean"], true);

    // Clock's today (2024-05-10) has no check-in yet.
    let (_, cards) = send(&app, "GET", "/dashboard", Some(&token), None).await;
    assert!(cards[0]["today"].is_null());

    send(
      &app,
      "PUT",
      "/check-ins",
      Some(&token),
      Some(json!({ "addiction_id": smoking, "is_clean": true })),
    )
    .await;
    let (_, cards) = send(&app, "GET", "/dashboard", Some(&token), None).await;
    assert_eq!(cards[0]["addiction"]["name"], "Smoking");
    assert_eq!(cards[0]["current_streak"], 5);
    assert_eq!(cards[0]["longest_streak"], 5);
  }
}
