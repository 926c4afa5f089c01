// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API route tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without a valid session
//! 2. Logged-in users get their activity collection and traces
//! 3. The login callback stores the token and sets the session cookie

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{
    create_test_app, create_test_jwt, mount_page, traced_activity, untraced_activity,
    ACTIVITIES_PATH, TOKEN_PATH,
};

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str, jwt: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(jwt) = jwt {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", jwt));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_activities_requires_session() {
    let server = MockServer::start().await;
    let (app, _) = create_test_app(&server);

    let response = app.oneshot(get("/api/activities", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_activities_rejects_forged_jwt() {
    let server = MockServer::start().await;
    let (app, _) = create_test_app(&server);
    let jwt = create_test_jwt(1, b"not_the_configured_signing_key!!");

    let response = app
        .oneshot(get("/api/activities", Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_activities_without_stored_token() {
    let server = MockServer::start().await;
    let (app, state) = create_test_app(&server);
    let jwt = create_test_jwt(77, &state.config.jwt_signing_key);

    // Valid session JWT, but the Strava token is gone (e.g. after restart).
    let response = app
        .oneshot(get("/api/activities", Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_activities_with_expired_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ACTIVITIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (app, state) = create_test_app(&server);
    state.sessions.store_token_until(
        78,
        "old-token".to_string(),
        chrono::Utc::now() - chrono::Duration::minutes(5),
    );
    let jwt = create_test_jwt(78, &state.config.jwt_signing_key);

    let response = app
        .oneshot(get("/api/activities", Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.sessions.session_count(), 0);
}

#[tokio::test]
async fn test_activities_fetch_and_cache() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        json!([traced_activity(21, 1609.34, 3661), untraced_activity(22, 0.0, 0)]),
    )
    .await;
    mount_page(&server, 2, json!([])).await;

    let (app, state) = create_test_app(&server);
    state.sessions.store_token(5, "strava-token".to_string());
    let jwt = create_test_jwt(5, &state.config.jwt_signing_key);

    let response = app
        .clone()
        .oneshot(get("/api/activities", Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["distanceTravelled"], "1.00 mi.");
    assert_eq!(json["timeElapsed"], "1:01:01");
    assert_eq!(json["totalActivities"], 2);
    assert_eq!(json["activities"]["21"]["displayTime"], "06/01/2024");
    assert!(json["activities"].get("22").is_none());

    // Second request is served from the cache: the mocks expect one hit each.
    let again = app
        .oneshot(get("/api/activities", Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(body_json(again).await, json);
}

#[tokio::test]
async fn test_activities_invalid_range() {
    let server = MockServer::start().await;
    let (app, state) = create_test_app(&server);
    state.sessions.store_token(5, "strava-token".to_string());
    let jwt = create_test_jwt(5, &state.config.jwt_signing_key);

    let response = app
        .oneshot(get("/api/activities?before=100&after=200", Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejected_strava_token_drops_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ACTIVITIES_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (app, state) = create_test_app(&server);
    state.sessions.store_token(9, "revoked".to_string());
    let jwt = create_test_jwt(9, &state.config.jwt_signing_key);

    let response = app
        .oneshot(get("/api/activities?refresh=true", Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(state.sessions.token(9).is_none());
}

#[tokio::test]
async fn test_traces_endpoint() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        json!([traced_activity(1, 100.0, 10), untraced_activity(2, 100.0, 10)]),
    )
    .await;
    mount_page(&server, 2, json!([])).await;

    let (app, state) = create_test_app(&server);
    state.sessions.store_token(3, "strava-token".to_string());
    let jwt = create_test_jwt(3, &state.config.jwt_signing_key);

    let response = app.oneshot(get("/api/traces", Some(&jwt))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let traces = json["traces"].as_array().unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0]["activity_id"], 1);
    assert_eq!(traces[0]["points"].as_array().unwrap().len(), 3);
    assert_eq!(json["bounds"]["min_lat"], 38.5);
    assert_eq!(json["bounds"]["max_lng"], -120.2);
}

#[tokio::test]
async fn test_login_callback_creates_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("code=auth-code-123"))
        .and(body_string_contains("client_id=test_client_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_at": 1_800_000_000,
            "expires_in": 21600,
            "refresh_token": "refresh",
            "access_token": "fresh-access",
            "athlete": {"id": 4242, "firstname": "Ada", "lastname": "L"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = create_test_app(&server);

    let response = app
        .oneshot(get("/strava-login?code=auth-code-123&scope=read,activity:read_all", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://localhost:5173"
    );
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("strava_tracks_token="));
    assert!(cookie.contains("HttpOnly"));

    assert_eq!(state.sessions.token(4242).as_deref(), Some("fresh-access"));
}

#[tokio::test]
async fn test_login_callback_missing_code() {
    let server = MockServer::start().await;
    let (app, _) = create_test_app(&server);

    let response = app.oneshot(get("/strava-login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_callback_denied() {
    let server = MockServer::start().await;
    let (app, _) = create_test_app(&server);

    let response = app
        .oneshot(get("/strava-login?error=access_denied", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://localhost:5173?error=access_denied"
    );
}

#[tokio::test]
async fn test_auth_start_redirects_to_strava() {
    let server = MockServer::start().await;
    let (app, _) = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/strava")
                .header(header::HOST, "localhost:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with(&format!("{}/oauth/authorize?", server.uri())));
    assert!(location.contains("client_id=test_client_id"));
    assert!(location.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fstrava-login"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = MockServer::start().await;
    let (app, state) = create_test_app(&server);
    state.sessions.store_token(8, "token".to_string());
    let jwt = create_test_jwt(8, &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/logout")
                .header(header::COOKIE, format!("strava_tracks_token={}", jwt))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("strava_tracks_token="));
    assert!(cookie.contains("Max-Age=0"));
    assert!(state.sessions.token(8).is_none());
}

#[tokio::test]
async fn test_health_reports_strava_availability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let (app, _) = create_test_app(&server);
    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["strava_available"], true);
}
