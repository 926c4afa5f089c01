// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity history fetching and aggregation.
//!
//! Pages through the athlete's activity list until Strava returns an empty
//! page, keeps the activities that carry a summary polyline and totals
//! distance and elapsed time over every record seen.
//!
//! Failure policy:
//! - transport, auth, status and whole-body parse errors abort the fetch
//!   and discard whatever was collected so far;
//! - a single record with an unexpected shape is logged and skipped, and
//!   pagination continues;
//! - a traced record whose start date cannot be read is left out of the
//!   mapping but still counted in the totals.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityCollection, ActivityMap};
use crate::services::strava::{StravaActivitySummary, StravaClient};
use crate::time_utils::{format_display_date, parse_strava_local};
use crate::units::meters_to_miles;

/// Time window for a fetch, in Unix epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRange {
    /// Only activities that started before this time
    pub before: i64,
    /// Only activities that started after this time
    pub after: i64,
}

impl FetchRange {
    /// Build a range, defaulting `before` to now and `after` to 0.
    pub fn new(before: Option<i64>, after: Option<i64>) -> Self {
        Self {
            before: before.unwrap_or_else(|| Utc::now().timestamp()),
            after: after.unwrap_or(0),
        }
    }
}

impl Default for FetchRange {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Running totals over every well-formed record of a fetch.
#[derive(Debug, Default)]
struct Totals {
    distance_meters: f64,
    elapsed_seconds: u64,
    records: u32,
}

/// Fetches a user's activity history from Strava.
#[derive(Clone)]
pub struct ActivityFetcher {
    client: StravaClient,
    per_page: u32,
    max_pages: u32,
    fetch_timeout: Duration,
    probe_timeout: Duration,
}

impl ActivityFetcher {
    pub fn new(client: StravaClient, config: &Config) -> Self {
        Self {
            client,
            per_page: config.per_page,
            max_pages: config.max_pages,
            fetch_timeout: config.fetch_timeout,
            probe_timeout: config.probe_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(StravaClient::from_config(config), config)
    }

    pub fn client(&self) -> &StravaClient {
        &self.client
    }

    /// Fetch every activity in `range` and aggregate totals.
    ///
    /// The whole operation is bounded by the configured fetch timeout.
    pub async fn fetch_activities(
        &self,
        access_token: &str,
        range: FetchRange,
    ) -> Result<ActivityCollection> {
        match tokio::time::timeout(self.fetch_timeout, self.fetch_all_pages(access_token, range))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.fetch_timeout.as_secs(),
                    before = range.before,
                    after = range.after,
                    "Activity fetch timed out"
                );
                Err(AppError::Timeout)
            }
        }
    }

    async fn fetch_all_pages(
        &self,
        access_token: &str,
        range: FetchRange,
    ) -> Result<ActivityCollection> {
        let mut activities = ActivityMap::new();
        let mut totals = Totals::default();
        let mut page: u32 = 1;

        loop {
            // max_pages counts requests, including the final empty one.
            if page > self.max_pages {
                tracing::warn!(
                    max_pages = self.max_pages,
                    "Activity list did not end within page limit"
                );
                return Err(AppError::PageLimitExceeded(self.max_pages));
            }

            let records = self
                .client
                .list_activities(access_token, range.before, range.after, page, self.per_page)
                .await?;

            tracing::debug!(page, count = records.len(), "Fetched activity page");

            // Only an empty page ends the list; a full page proves nothing.
            if records.is_empty() {
                break;
            }

            for record in records {
                accumulate(record, &mut activities, &mut totals);
            }

            page += 1;
        }

        tracing::info!(
            pages = page,
            records = totals.records,
            activities = activities.len(),
            "Activity fetch complete"
        );

        Ok(ActivityCollection::new(
            activities,
            totals.distance_meters,
            totals.elapsed_seconds,
            totals.records,
        ))
    }

    /// Whether Strava is reachable. Never fails; errors count as unavailable.
    pub async fn check_availability(&self) -> bool {
        self.client.probe(self.probe_timeout).await
    }
}

/// Fold one raw record into the mapping and the totals.
fn accumulate(record: Value, activities: &mut ActivityMap, totals: &mut Totals) {
    let summary = match StravaActivitySummary::from_value(record) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed activity record");
            return;
        }
    };

    // Totals cover every well-formed record, traced or not.
    if let Some(polyline) = summary.summary_polyline() {
        match normalize(&summary, polyline) {
            Ok(activity) => {
                activities.insert(activity);
            }
            Err(e) => {
                tracing::warn!(
                    activity_id = summary.id,
                    error = %e,
                    "Leaving activity with unreadable start date out of the mapping"
                );
            }
        }
    }

    totals.distance_meters += summary.distance;
    totals.elapsed_seconds += summary.elapsed_time;
    totals.records += 1;
}

/// Build the compact record for a summary that carries a polyline.
fn normalize(summary: &StravaActivitySummary, polyline: &str) -> Result<Activity> {
    let raw_start = summary
        .start_date_local
        .as_deref()
        .ok_or_else(|| AppError::MalformedResponse("missing start_date_local".to_string()))?;

    let start = parse_strava_local(raw_start).map_err(|e| {
        AppError::MalformedResponse(format!("bad start_date_local {:?}: {}", raw_start, e))
    })?;

    Ok(Activity {
        id: summary.id,
        name: summary.name.clone(),
        polyline: Some(polyline.to_string()),
        display_time: format_display_date(start),
        activity_type: summary.activity_type.clone(),
        distance_miles: meters_to_miles(summary.distance),
    })
}
