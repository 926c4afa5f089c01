// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Paginated activity listing
//! - OAuth authorization code exchange
//! - Availability probing of the token endpoint
//!
//! Wire types are validated here so that callers only ever see typed
//! summaries or an [`AppError`].

use crate::config::Config;
use crate::error::AppError;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Longest slice of an error body kept in error messages.
const ERROR_BODY_LIMIT: usize = 256;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a client against explicit endpoints.
    pub fn new(
        base_url: &str,
        token_url: &str,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
            client_id,
            client_secret,
        }
    }

    /// Create a client from application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.strava_api_url,
            &config.strava_token_url,
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
        )
    }

    /// List one page of the athlete's activities.
    ///
    /// Returns the raw records of the page; an empty vector means there is
    /// no more data. Records are validated individually with
    /// [`StravaActivitySummary::from_value`] so one bad entry does not
    /// poison the page.
    pub async fn list_activities(
        &self,
        access_token: &str,
        before: i64,
        after: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, AppError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("before", before.to_string()),
                ("after", after.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        let body: Value = self.check_response_json(response).await?;
        match body {
            Value::Array(records) => Ok(records),
            other => Err(AppError::MalformedResponse(format!(
                "expected a JSON array of activities, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Exchange an OAuth authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        self.check_response_json(response).await
    }

    /// Probe the token endpoint without credentials.
    ///
    /// The endpoint only accepts POST, so a 4xx answer still means the
    /// service is up. Transport failures, timeouts and 5xx count as down.
    pub async fn probe(&self, timeout: Duration) -> bool {
        match self
            .http
            .get(&self.token_url)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                if status.is_server_error() {
                    tracing::warn!(status = %status, "Strava availability probe got server error");
                    false
                } else {
                    true
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Strava availability probe failed");
                false
            }
        }
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::MalformedResponse(format!("JSON parse error: {}", e)))
    }
}

/// Map a non-success status to the matching error class.
fn error_from_status(status: u16, body: &str) -> AppError {
    let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    match status {
        401 | 403 => AppError::Unauthorized(snippet),
        429 => {
            tracing::warn!("Strava rate limit hit (429)");
            AppError::RateLimited
        }
        _ => AppError::StravaApi {
            status,
            body: snippet,
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Summary activity from the list endpoint.
///
/// Only the fields this crate uses are modelled; everything else in the
/// record is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Local wall-clock start, `YYYY-MM-DDTHH:MM:SSZ`
    pub start_date_local: Option<String>,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub elapsed_time: u64,
    #[serde(default)]
    pub map: Option<StravaMap>,
}

impl StravaActivitySummary {
    /// Validate one raw list record.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        serde_json::from_value(value).map_err(|e| AppError::MalformedResponse(e.to_string()))
    }

    /// The summary polyline, if the record carries one (may be empty).
    pub fn summary_polyline(&self) -> Option<&str> {
        self.map.as_ref()?.summary_polyline.as_deref()
    }
}

/// Activity map data with polylines.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaMap {
    #[serde(default)]
    pub summary_polyline: Option<String>,
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub athlete: StravaAthlete,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}
