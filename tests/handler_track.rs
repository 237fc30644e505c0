mod common;

use affiliate_tracker::api::handlers::{click_handler, pixel_handler};
use axum::{Router, routing::get};
use axum_test::TestServer;
use rust_decimal::Decimal;
use sqlx::PgPool;

fn tracking_app(state: affiliate_tracker::AppState) -> Router {
    Router::new()
        .route("/track/click/{code}", get(click_handler))
        .route("/track/pixel/{code}", get(pixel_handler))
        .layer(common::MockConnectInfoLayer)
        .with_state(state)
}

#[sqlx::test]
async fn test_click_redirects_and_sets_cookie(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = TestServer::new(tracking_app(state)).unwrap();

    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "spring42").await;

    let response = server
        .get("/track/click/spring42")
        .add_header("User-Agent", "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Safari/604.1")
        .await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://shop.example.com/spring");
    assert_eq!(response.header("cache-control"), "no-store");

    let cookie = response.header("set-cookie");
    let cookie = cookie.to_str().unwrap();
    assert!(cookie.starts_with("aff_ref="));
    assert!(cookie.contains("Max-Age=2592000"));
    assert!(cookie.contains("HttpOnly"));

    assert_eq!(common::count_clicks(&pool, link_id).await, 1);

    let (device, browser): (String, String) =
        sqlx::query_as("SELECT device, browser FROM clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(device, "mobile");
    assert_eq!(browser, "safari");

    let counters: (i64, i64) = sqlx::query_as(
        "SELECT l.clicks, c.total_clicks FROM affiliate_links l JOIN campaigns c ON c.id = l.campaign_id WHERE l.id = $1",
    )
    .bind(link_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(counters, (1, 1));
}

#[sqlx::test]
async fn test_click_unknown_code(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = TestServer::new(tracking_app(state)).unwrap();

    let response = server.get("/track/click/nosuchcode").await;

    assert_eq!(response.status_code(), 404);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "link_not_found");
}

#[sqlx::test]
async fn test_click_expired_link_records_nothing(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = TestServer::new(tracking_app(state)).unwrap();

    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_expired_link(&pool, campaign_id, 42, "expired42").await;

    let response = server.get("/track/click/expired42").await;

    assert_eq!(response.status_code(), 410);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "link_expired");
    assert_eq!(common::count_clicks(&pool, link_id).await, 0);
}

#[sqlx::test]
async fn test_click_paused_campaign(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = TestServer::new(tracking_app(state)).unwrap();

    let campaign_id = common::create_test_campaign(&pool, "PAUSED", Decimal::new(10, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "paused42").await;

    let response = server.get("/track/click/paused42").await;

    assert_eq!(response.status_code(), 410);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "campaign_not_active");
    assert_eq!(common::count_clicks(&pool, link_id).await, 0);
}

#[sqlx::test]
async fn test_pixel_queues_event(pool: PgPool) {
    let (state, mut rx) = common::create_test_state(pool);
    let server = TestServer::new(tracking_app(state)).unwrap();

    let response = server
        .get("/track/pixel/anycode")
        .add_header("Referer", "https://blog.example.org/review")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert!(response.as_bytes().starts_with(b"\x89PNG"));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.code, "anycode");
    assert_eq!(event.metadata.ip.as_deref(), Some("127.0.0.1"));
    assert_eq!(
        event.metadata.referer.as_deref(),
        Some("https://blog.example.org/review")
    );
}

#[sqlx::test]
async fn test_pixel_served_when_queue_closed(pool: PgPool) {
    let (state, rx) = common::create_test_state(pool);
    drop(rx);
    let server = TestServer::new(tracking_app(state)).unwrap();

    let response = server.get("/track/pixel/anycode").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
}
