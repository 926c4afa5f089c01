// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Tracks API Server
//!
//! Serves a logged-in user's Strava activity history, totals and decoded
//! GPS traces as JSON.

use std::sync::Arc;
use std::time::Duration;
use strava_tracks::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often expired sessions are swept from memory.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        per_page = config.per_page,
        max_pages = config.max_pages,
        "Starting Strava-Tracks API"
    );

    let state = Arc::new(AppState::from_config(config.clone()));

    if !state.fetcher.check_availability().await {
        tracing::warn!("Strava did not answer the startup probe; serving anyway");
    }

    // Sessions whose JWT has expired never come back to be evicted on lookup.
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::info!(
                    purged,
                    remaining = sessions.session_count(),
                    "Purged expired sessions"
                );
            }
        }
    });

    // Build router
    let app = strava_tracks::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("strava_tracks=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .try_init()?;
    Ok(())
}
