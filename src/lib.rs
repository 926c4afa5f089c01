// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Tracks: fetch a Strava athlete's activity history and traces
//!
//! This crate logs a user in with Strava, pages through their activity
//! list, keeps the activities that carry a GPS trace and totals distance
//! and elapsed time over the whole range.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod units;

use config::Config;
use services::{ActivityFetcher, SessionStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub fetcher: ActivityFetcher,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wire up state from configuration with an empty session store.
    pub fn from_config(config: Config) -> Self {
        let fetcher = ActivityFetcher::from_config(&config);
        Self {
            config,
            fetcher,
            sessions: SessionStore::new(),
        }
    }
}
