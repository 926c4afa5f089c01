// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityCollection, DecodedTrace};
use crate::services::{extract_polylines, trace_bounds, FetchRange};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(get_activities))
        .route("/api/traces", get(get_traces))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ActivitiesQuery {
    /// Upper bound, Unix seconds (default: now)
    before: Option<i64>,
    /// Lower bound, Unix seconds (default: 0)
    after: Option<i64>,
    /// Bypass the cached collection
    #[serde(default)]
    refresh: bool,
}

impl ActivitiesQuery {
    fn validate(&self) -> Result<()> {
        if self.before.is_some_and(|b| b < 0) || self.after.is_some_and(|a| a < 0) {
            return Err(AppError::BadRequest(
                "before/after must be non-negative Unix timestamps".to_string(),
            ));
        }
        if let (Some(before), Some(after)) = (self.before, self.after) {
            if after >= before {
                return Err(AppError::BadRequest(
                    "after must be earlier than before".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Only the open-ended default range is cached.
    fn is_default_range(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}

/// Get the user's activities and totals.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<ActivityCollection>> {
    query.validate()?;
    let collection = load_collection(&state, user.athlete_id, &query).await?;
    Ok(Json(collection.as_ref().clone()))
}

/// Return the cached collection or fetch a fresh one.
///
/// Fetches for one user are serialized so concurrent requests do not
/// page through Strava twice.
async fn load_collection(
    state: &AppState,
    athlete_id: u64,
    query: &ActivitiesQuery,
) -> Result<Arc<ActivityCollection>> {
    let access_token = state
        .sessions
        .token(athlete_id)
        .ok_or(AppError::NotAuthenticated)?;

    let lock = state.sessions.fetch_lock(athlete_id);
    let _guard = lock.lock().await;

    let cacheable = query.is_default_range();
    if cacheable && !query.refresh {
        if let Some(cached) = state.sessions.cached_collection(athlete_id) {
            tracing::debug!(athlete_id, "Serving cached activity collection");
            return Ok(cached);
        }
    }

    let range = FetchRange::new(query.before, query.after);
    let collection = match state.fetcher.fetch_activities(&access_token, range).await {
        Ok(c) => Arc::new(c),
        Err(e) if e.requires_reauth() => {
            tracing::info!(athlete_id, "Strava rejected token, dropping session");
            state.sessions.remove(athlete_id);
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    if collection.has_no_data() {
        tracing::info!(athlete_id, "No activity history in range");
    }

    if cacheable {
        state
            .sessions
            .cache_collection(athlete_id, collection.clone());
    }

    Ok(collection)
}

// ─── Traces ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TraceResponse {
    pub activity_id: u64,
    /// `[latitude, longitude]` pairs in path order
    pub points: Vec<[f64; 2]>,
}

impl From<&DecodedTrace> for TraceResponse {
    fn from(trace: &DecodedTrace) -> Self {
        Self {
            activity_id: trace.activity_id,
            points: trace.lat_lngs().map(|(lat, lng)| [lat, lng]).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BoundsResponse {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

#[derive(Debug, Serialize)]
pub struct TracesResponse {
    pub traces: Vec<TraceResponse>,
    pub bounds: Option<BoundsResponse>,
}

/// Get decoded polylines for the user's (default range) activities.
async fn get_traces(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TracesResponse>> {
    let collection = load_collection(&state, user.athlete_id, &ActivitiesQuery::default()).await?;

    let decoded: Vec<DecodedTrace> = extract_polylines(collection.activities())
        .filter_map(|result| match result {
            Ok(trace) => Some(trace),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable polyline");
                None
            }
        })
        .collect();

    let bounds = trace_bounds(&decoded).map(|rect| BoundsResponse {
        min_lat: rect.min().y,
        min_lng: rect.min().x,
        max_lat: rect.max().y,
        max_lng: rect.max().x,
    });

    Ok(Json(TracesResponse {
        traces: decoded.iter().map(TraceResponse::from).collect(),
        bounds,
    }))
}
