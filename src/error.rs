// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No session cookie / bearer JWT on a protected route.
    #[error("Authentication required")]
    NotAuthenticated,

    /// Strava rejected the access token (401/403).
    #[error("Strava rejected the access token: {0}")]
    Unauthorized(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Network or connection failure talking to Strava.
    #[error("Strava transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape.
    #[error("Malformed Strava response: {0}")]
    MalformedResponse(String),

    #[error("Strava rate limit exceeded")]
    RateLimited,

    #[error("Strava API error (HTTP {status}): {body}")]
    StravaApi { status: u16, body: String },

    #[error("Gave up after {0} pages without reaching the end of the activity list")]
    PageLimitExceeded(u32),

    #[error("Strava fetch timed out")]
    Timeout,

    #[error("Failed to decode polyline: {0}")]
    Polyline(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the caller should send the user through login again.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, AppError::Unauthorized(_) | AppError::NotAuthenticated)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout
        } else if err.is_decode() {
            AppError::MalformedResponse(err.to_string())
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "strava_unauthorized", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Transport(msg) => {
                tracing::warn!(error = %msg, "Strava transport error");
                (StatusCode::BAD_GATEWAY, "strava_unreachable", None)
            }
            AppError::MalformedResponse(msg) => (
                StatusCode::BAD_GATEWAY,
                "strava_malformed_response",
                Some(msg.clone()),
            ),
            AppError::RateLimited => (StatusCode::SERVICE_UNAVAILABLE, "strava_rate_limited", None),
            AppError::StravaApi { status, .. } => (
                StatusCode::BAD_GATEWAY,
                "strava_error",
                Some(format!("HTTP {}", status)),
            ),
            AppError::PageLimitExceeded(pages) => (
                StatusCode::BAD_GATEWAY,
                "too_many_pages",
                Some(format!("stopped after {} pages", pages)),
            ),
            AppError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "strava_timeout", None),
            AppError::Polyline(msg) => {
                tracing::error!(error = %msg, "Polyline decode error");
                (StatusCode::INTERNAL_SERVER_ERROR, "polyline_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
