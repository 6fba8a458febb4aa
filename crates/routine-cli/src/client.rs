//! Async HTTP client wrapping the Reset Routine JSON API.
//!
//! Every authenticated call takes the caller's [`Session`] explicitly; the
//! client itself holds no identity.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::{Client, Response};
use routine_core::{
  addiction::{Addiction, Color},
  check_in::CheckIn,
  identity::Session,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the Reset Routine JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn ensure_success(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = match resp.json::<ErrorBody>().await {
    Ok(body) => body.error,
    Err(_) => status.to_string(),
  };
  Err(anyhow!(message))
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Identity ──────────────────────────────────────────────────────────────

  /// `POST /api/auth/sign-in`
  pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
    self.credentials("/auth/sign-in", email, password).await
  }

  /// `POST /api/auth/sign-up`
  pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
    self.credentials("/auth/sign-up", email, password).await
  }

  async fn credentials(&self, path: &str, email: &str, password: &str) -> Result<Session> {
    let resp = self
      .client
      .post(self.url(path))
      .json(&json!({ "email": email, "password": password }))
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    ensure_success(resp)
      .await?
      .json()
      .await
      .context("deserialising session")
  }

  /// `POST /api/auth/sign-out`
  pub async fn sign_out(&self, session: &Session) -> Result<()> {
    let resp = self
      .client
      .post(self.url("/auth/sign-out"))
      .bearer_auth(&session.token)
      .send()
      .await
      .context("POST /auth/sign-out failed")?;
    ensure_success(resp).await?;
    Ok(())
  }

  // ── Addictions ────────────────────────────────────────────────────────────

  /// `GET /api/addictions?order=desc`
  pub async fn list_addictions(&self, session: &Session) -> Result<Vec<Addiction>> {
    let resp = self
      .client
      .get(self.url("/addictions"))
      .bearer_auth(&session.token)
      .query(&[("order", "desc")])
      .send()
      .await
      .context("GET /addictions failed")?;
    ensure_success(resp)
      .await?
      .json()
      .await
      .context("deserialising addictions")
  }

  /// `POST /api/addictions`
  pub async fn add_addiction(
    &self,
    session: &Session,
    name: &str,
    description: Option<&str>,
    color: Color,
  ) -> Result<Addiction> {
    let resp = self
      .client
      .post(self.url("/addictions"))
      .bearer_auth(&session.token)
      .json(&json!({
        "name": name,
        "description": description,
        "color": color.hex(),
      }))
      .send()
      .await
      .context("POST /addictions failed")?;
    ensure_success(resp)
      .await?
      .json()
      .await
      .context("deserialising addiction")
  }

  // ── Check-ins ─────────────────────────────────────────────────────────────

  /// `GET /api/check-ins?order=desc`
  pub async fn list_check_ins(&self, session: &Session) -> Result<Vec<CheckIn>> {
    let resp = self
      .client
      .get(self.url("/check-ins"))
      .bearer_auth(&session.token)
      .query(&[("order", "desc")])
      .send()
      .await
      .context("GET /check-ins failed")?;
    ensure_success(resp)
      .await?
      .json()
      .await
      .context("deserialising check-ins")
  }

  /// `PUT /api/check-ins`
  pub async fn check_in(
    &self,
    session: &Session,
    addiction_id: Uuid,
    date: NaiveDate,
    is_clean: bool,
  ) -> Result<CheckIn> {
    let resp = self
      .client
      .put(self.url("/check-ins"))
      .bearer_auth(&session.token)
      .json(&json!({
        "addiction_id": addiction_id,
        "check_in_date": date,
        "is_clean": is_clean,
      }))
      .send()
      .await
      .context("PUT /check-ins failed")?;
    ensure_success(resp)
      .await?
      .json()
      .await
      .context("deserialising check-in")
  }
}
