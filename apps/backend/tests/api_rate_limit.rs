//! Rate limiting tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

use common::TestContext;

/// The request over the per-minute limit is rejected with retry guidance.
#[tokio::test]
async fn test_rate_limit_blocks_over_limit() {
    let ctx = TestContext::with_rate_limit(2).await;
    let server = TestServer::new(ctx.router()).unwrap();

    server.get("/groups").await.assert_status_ok();
    server.get("/groups").await.assert_status_ok();

    let response = server.get("/groups").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .expect("missing Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Too many requests");
}

/// Distinct client addresses get independent windows.
#[tokio::test]
async fn test_rate_limit_keys_by_client_address() {
    let ctx = TestContext::with_rate_limit(1).await;
    let server = TestServer::new(ctx.router()).unwrap();

    server
        .get("/groups")
        .add_header(
            axum::http::HeaderName::from_static("x-forwarded-for"),
            axum::http::HeaderValue::from_static("10.0.0.1"),
        )
        .await
        .assert_status_ok();

    // A different client is still allowed.
    server
        .get("/groups")
        .add_header(
            axum::http::HeaderName::from_static("x-forwarded-for"),
            axum::http::HeaderValue::from_static("10.0.0.2"),
        )
        .await
        .assert_status_ok();

    // The first client is now over its limit.
    let response = server
        .get("/groups")
        .add_header(
            axum::http::HeaderName::from_static("x-forwarded-for"),
            axum::http::HeaderValue::from_static("10.0.0.1"),
        )
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
}
