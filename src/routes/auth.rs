// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth login routes.
//!
//! The callback only parses the request, exchanges the code through
//! [`StravaClient`](crate::services::StravaClient) and records the token;
//! fetching happens later through the API routes.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, verify_jwt, SESSION_COOKIE};
use crate::AppState;

/// Path Strava redirects back to after the user approves access.
pub const CALLBACK_PATH: &str = "/strava-login";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava", get(auth_start))
        .route(CALLBACK_PATH, get(auth_callback))
        .route("/auth/logout", get(logout))
}

/// Start OAuth flow - redirect to Strava authorization.
async fn auth_start(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    let callback_url = format!("{}{}", service_origin(&headers), CALLBACK_PATH);

    let auth_url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&approval_prompt=auto&scope=activity:read_all",
        state.config.strava_auth_url,
        urlencoding::encode(&state.config.strava_client_id),
        urlencoding::encode(&callback_url),
    );

    tracing::info!(
        client_id = %state.config.strava_client_id,
        callback = %callback_url,
        "Starting OAuth flow, redirecting to Strava"
    );

    Redirect::temporary(&auth_url)
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for a token, create session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        let redirect = format!(
            "{}?error={}",
            state.config.frontend_url,
            urlencoding::encode(&error)
        );
        return Ok((jar, Redirect::temporary(&redirect)));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing authorization code".to_string()))?;

    tracing::info!("Exchanging authorization code for token");
    let exchange = state.fetcher.client().exchange_code(&code).await?;
    let athlete_id = exchange.athlete.id;

    state.sessions.store_token(athlete_id, exchange.access_token);

    let jwt = create_jwt(athlete_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(
        athlete_id,
        firstname = exchange.athlete.firstname.as_deref().unwrap_or(""),
        "OAuth successful, session created"
    );

    let cookie = Cookie::build((SESSION_COOKIE, jwt))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Redirect::temporary(&state.config.frontend_url),
    ))
}

/// Logout - drop the stored token and clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(athlete_id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| verify_jwt(c.value(), &state.config.jwt_signing_key))
    {
        state.sessions.remove(athlete_id);
        tracing::info!(athlete_id, "Logged out");
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::temporary(&state.config.frontend_url))
}

/// Scheme and host this service is reached on, from the request headers.
fn service_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}", scheme, host)
}
