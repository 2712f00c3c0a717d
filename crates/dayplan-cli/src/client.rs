//! Async HTTP client wrapping the dayplan JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dayplan_core::preference::{EventDate, Preference, PreferenceAction};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Header carrying the shared admin password on write requests.
const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

/// Connection settings for the dayplan API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub password: String,
}

/// The `message` half of `{ "status": ..., "message": ... }` replies.
#[derive(Debug, Deserialize)]
pub struct StatusMessage {
  pub message: String,
}

/// Async HTTP client for the dayplan JSON REST API.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
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

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.password.is_empty() {
      req
    } else {
      req.header(ADMIN_PASSWORD_HEADER, &self.config.password)
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// `GET /api/preferences`
  pub async fn list(&self) -> Result<Vec<Preference>> {
    let resp = self
      .client
      .get(self.url("/preferences"))
      .send()
      .await
      .context("GET /preferences failed")?;
    let resp = ensure_success(resp, "GET /preferences").await?;
    resp.json().await.context("deserialising preferences")
  }

  /// `POST /api/auth/login` with only the password header.
  ///
  /// Nothing is kept between invocations, so this answers whether the
  /// configured password would unlock edit mode.
  pub async fn check_password(&self) -> Result<bool> {
    let resp = self
      .auth(self.client.post(self.url("/auth/login")))
      .send()
      .await
      .context("POST /auth/login failed")?;
    if resp.status() == StatusCode::UNAUTHORIZED {
      return Ok(false);
    }
    ensure_success(resp, "POST /auth/login").await?;
    Ok(true)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// `POST /api/preferences`
  pub async fn update(
    &self,
    user_name: &str,
    event_date: EventDate,
    action: PreferenceAction,
  ) -> Result<StatusMessage> {
    let preference_type = match action {
      PreferenceAction::Set(kind) => kind.to_string(),
      PreferenceAction::Clear => "clear".to_string(),
    };
    let body = json!({
      "user_name":       user_name,
      "event_date":      event_date,
      "preference_type": preference_type,
    });

    let resp = self
      .auth(self.client.post(self.url("/preferences")))
      .json(&body)
      .send()
      .await
      .context("POST /preferences failed")?;
    let resp = ensure_success(resp, "POST /preferences").await?;
    resp.json().await.context("deserialising update response")
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  match resp.json::<StatusMessage>().await {
    Ok(body) => Err(anyhow!("{what} → {status}: {}", body.message)),
    Err(_) => Err(anyhow!("{what} → {status}")),
  }
}
