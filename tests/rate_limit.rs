mod common;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;
use std::sync::Arc;

use hyperlink::application::services::RateLimitFailurePolicy;

fn tight_limits() -> hyperlink::state::ServiceSettings {
    let mut settings = common::test_settings();
    settings.rate_limit.user_limit = 3;
    settings.rate_limit.ip_limit = 2;
    settings
}

#[tokio::test]
async fn test_user_limit_is_enforced() {
    let app = common::spawn_app_with(tight_limits(), None, None);
    let auth = app.bearer_for(1).await;

    for i in 0..3 {
        let response = app
            .server
            .post("/api/shorten")
            .add_header("Authorization", auth.clone())
            .json(&json!({ "url": format!("https://example.com/{i}") }))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.headers()["x-ratelimit-limit"], "3");
    }

    let denied = app
        .server
        .post("/api/shorten")
        .add_header("Authorization", auth)
        .json(&json!({ "url": "https://example.com/3" }))
        .await;

    denied.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(denied.headers()["x-ratelimit-remaining"], "0");
    assert_eq!(denied.headers()["retry-after"], "60");
    let json = denied.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "rate_limited");
    assert_eq!(
        json["error"]["message"],
        "Rate limit exceeded. Try again in 60 seconds."
    );
}

#[tokio::test]
async fn test_users_are_limited_independently() {
    let app = common::spawn_app_with(tight_limits(), None, None);
    let alice = app.bearer_for(1).await;
    let bob = app.bearer_for(2).await;

    for _ in 0..3 {
        app.server
            .get("/api/links")
            .add_header("Authorization", alice.clone())
            .await
            .assert_status_ok();
    }
    app.server
        .get("/api/links")
        .add_header("Authorization", alice)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    app.server
        .get("/api/links")
        .add_header("Authorization", bob)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_anonymous_redirects_limited_by_ip() {
    let app = common::spawn_app_with(tight_limits(), None, None);

    app.server.get("/abcd1234").await.assert_status_not_found();
    app.server.get("/abcd1234").await.assert_status_not_found();

    let denied = app.server.get("/abcd1234").await;
    denied.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(denied.headers()["x-ratelimit-limit"], "2");
}

#[tokio::test]
async fn test_limit_recovers_after_two_windows() {
    let app = common::spawn_app_with(tight_limits(), None, None);

    for _ in 0..2 {
        app.server.get("/abcd1234").await;
    }
    app.server
        .get("/abcd1234")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    app.clock.advance(Duration::seconds(120));

    app.server.get("/abcd1234").await.assert_status_not_found();
}

#[tokio::test]
async fn test_unauthenticated_requests_are_not_counted_against_users() {
    let app = common::spawn_app_with(tight_limits(), None, None);
    let auth = app.bearer_for(1).await;

    // Rejected by auth before the limiter runs.
    for _ in 0..5 {
        app.server
            .get("/api/links")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    app.server
        .get("/api/links")
        .add_header("Authorization", auth)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_store_outage_fails_open_by_default() {
    let app = common::spawn_app_with(tight_limits(), Some(Arc::new(common::DownCounterStore)), None);

    for _ in 0..5 {
        let response = app.server.get("/abcd1234").await;
        response.assert_status_not_found();
        assert_eq!(response.headers()["x-ratelimit-remaining"], "2");
    }
}

#[tokio::test]
async fn test_store_outage_fails_closed_when_configured() {
    let mut settings = tight_limits();
    settings.rate_limit.failure_policy = RateLimitFailurePolicy::FailClosed;
    let app = common::spawn_app_with(settings, Some(Arc::new(common::DownCounterStore)), None);

    app.server
        .get("/abcd1234")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
