// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use strava_tracks::config::Config;
use strava_tracks::routes::create_router;
use strava_tracks::services::ActivityFetcher;
use strava_tracks::AppState;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the activity list endpoint on the mock server.
#[allow(dead_code)]
pub const ACTIVITIES_PATH: &str = "/api/v3/athlete/activities";

/// Path of the token endpoint on the mock server.
#[allow(dead_code)]
pub const TOKEN_PATH: &str = "/oauth/token";

/// Config pointing every Strava endpoint at the mock server.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    Config {
        strava_api_url: format!("{}/api/v3", server.uri()),
        strava_token_url: format!("{}{}", server.uri(), TOKEN_PATH),
        strava_auth_url: format!("{}/oauth/authorize", server.uri()),
        fetch_timeout: Duration::from_secs(10),
        probe_timeout: Duration::from_secs(2),
        ..Config::default()
    }
}

/// Fetcher against the mock server with the given config tweaks applied.
#[allow(dead_code)]
pub fn test_fetcher(server: &MockServer, tweak: impl FnOnce(&mut Config)) -> ActivityFetcher {
    let mut config = test_config(server);
    tweak(&mut config);
    ActivityFetcher::from_config(&config)
}

/// Create a test app backed by the mock server.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::from_config(test_config(server)));
    (create_router(state.clone()), state)
}

/// Create a session JWT the way the login callback does.
#[allow(dead_code)]
pub fn create_test_jwt(athlete_id: u64, signing_key: &[u8]) -> String {
    strava_tracks::middleware::auth::create_jwt(athlete_id, signing_key)
        .expect("Failed to create JWT")
}

/// A Strava summary activity with a GPS trace.
#[allow(dead_code)]
pub fn traced_activity(id: u64, distance: f64, elapsed_time: u64) -> Value {
    json!({
        "resource_state": 2,
        "id": id,
        "name": format!("Activity {}", id),
        "type": "Ride",
        "sport_type": "Ride",
        "start_date": "2024-06-01T15:04:05Z",
        "start_date_local": "2024-06-01T08:04:05Z",
        "timezone": "(GMT-08:00) America/Los_Angeles",
        "distance": distance,
        "moving_time": elapsed_time,
        "elapsed_time": elapsed_time,
        "map": {
            "id": format!("a{}", id),
            "summary_polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
            "resource_state": 2
        }
    })
}

/// A Strava summary activity without a trace (e.g. treadmill).
#[allow(dead_code)]
pub fn untraced_activity(id: u64, distance: f64, elapsed_time: u64) -> Value {
    json!({
        "resource_state": 2,
        "id": id,
        "name": format!("Indoor {}", id),
        "type": "Run",
        "start_date_local": "2024-06-02T06:00:00Z",
        "distance": distance,
        "elapsed_time": elapsed_time,
        "map": {"id": format!("a{}", id), "summary_polyline": null, "resource_state": 2}
    })
}

/// Mount a page of the activity list, expected to be requested exactly once.
#[allow(dead_code)]
pub async fn mount_page(server: &MockServer, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path(ACTIVITIES_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}
