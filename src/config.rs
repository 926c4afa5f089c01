// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;
use std::time::Duration;

/// Strava's largest accepted page size for the activity list endpoint.
pub const MAX_PER_PAGE: u32 = 200;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Strava endpoints ---
    /// Base URL of the REST API (no trailing slash)
    pub strava_api_url: String,
    /// OAuth token endpoint, also used as the availability probe target
    pub strava_token_url: String,
    /// OAuth authorize page users are redirected to
    pub strava_auth_url: String,

    // --- OAuth client ---
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,

    // --- Fetch tuning ---
    /// Page size requested from the activity list endpoint
    pub per_page: u32,
    /// Hard cap on pages requested by a single fetch
    pub max_pages: u32,
    /// Deadline for a whole fetch (all pages)
    pub fetch_timeout: Duration,
    /// Deadline for the availability probe
    pub probe_timeout: Duration,

    // --- Web service ---
    /// Frontend URL to land on after login
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_api_url: "https://www.strava.com/api/v3".to_string(),
            strava_token_url: "https://www.strava.com/oauth/token".to_string(),
            strava_auth_url: "https://www.strava.com/oauth/authorize".to_string(),
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            per_page: MAX_PER_PAGE,
            max_pages: 50,
            fetch_timeout: Duration::from_secs(120),
            probe_timeout: Duration::from_secs(5),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Lets tests supply values without touching the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let per_page = parse_or(&mut get, "STRAVA_PER_PAGE", defaults.per_page)?;
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(ConfigError::Invalid {
                key: "STRAVA_PER_PAGE",
                reason: format!("must be between 1 and {}", MAX_PER_PAGE),
            });
        }

        let max_pages = parse_or(&mut get, "STRAVA_MAX_PAGES", defaults.max_pages)?;
        if max_pages == 0 {
            return Err(ConfigError::Invalid {
                key: "STRAVA_MAX_PAGES",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            strava_api_url: get("STRAVA_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.strava_api_url),
            strava_token_url: get("STRAVA_TOKEN_URL").unwrap_or(defaults.strava_token_url),
            strava_auth_url: get("STRAVA_AUTH_URL").unwrap_or(defaults.strava_auth_url),

            strava_client_id: get("STRAVA_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .ok_or(ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: get("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .ok_or(ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,

            per_page,
            max_pages,
            fetch_timeout: parse_timeout(
                &mut get,
                "STRAVA_FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout,
            )?,
            probe_timeout: parse_timeout(
                &mut get,
                "STRAVA_PROBE_TIMEOUT_SECS",
                defaults.probe_timeout,
            )?,

            frontend_url: get("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            port: parse_or(&mut get, "PORT", defaults.port)?,
            jwt_signing_key: get("JWT_SIGNING_KEY")
                .ok_or(ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_or<F, T>(get: &mut F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

/// Parse a timeout in whole seconds; zero is rejected.
fn parse_timeout<F>(
    get: &mut F,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let secs: u64 = parse_or(get, key, default.as_secs())?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
