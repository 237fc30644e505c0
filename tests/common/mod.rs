#![allow(dead_code)]

use affiliate_tracker::application::services::auth_service::hash_token;
use affiliate_tracker::domain::click_event::ClickEvent;
use affiliate_tracker::state::{AppState, StateSettings};
use axum::extract::ConnectInfo;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::Layer;

pub const TOKEN_SECRET: &str = "test-signing-secret";
pub const ATTRIBUTION_SECRET: &str = "test-attribution-secret";
pub const COOKIE_NAME: &str = "aff_ref";

pub fn create_test_state(pool: PgPool) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(100);

    let state = AppState::new(
        Arc::new(pool),
        tx,
        StateSettings {
            token_signing_secret: TOKEN_SECRET.to_string(),
            attribution_secret: ATTRIBUTION_SECRET.to_string(),
            attribution_window_days: 30,
            attribution_cookie: COOKIE_NAME.to_string(),
            behind_proxy: false,
        },
    );

    (state, rx)
}

/// Inserts a campaign paying `value` percent of each sale.
pub async fn create_test_campaign(pool: &PgPool, status: &str, percent: Decimal) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO campaigns (creator_id, name, landing_url, commission_type, commission_value, status)
        VALUES (7, 'Spring Sale', 'https://shop.example.com/', 'PERCENTAGE', $1, $2)
        RETURNING id
        "#,
    )
    .bind(percent)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_link(pool: &PgPool, campaign_id: i64, affiliate_id: i64, code: &str) -> i64 {
    insert_link(pool, campaign_id, affiliate_id, code, None).await
}

pub async fn create_expired_link(
    pool: &PgPool,
    campaign_id: i64,
    affiliate_id: i64,
    code: &str,
) -> i64 {
    let expired = Utc::now() - chrono::Duration::hours(1);
    insert_link(pool, campaign_id, affiliate_id, code, Some(expired)).await
}

async fn insert_link(
    pool: &PgPool,
    campaign_id: i64,
    affiliate_id: i64,
    code: &str,
    expires_at: Option<DateTime<Utc>>,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO affiliate_links (campaign_id, affiliate_id, tracking_code, is_custom, destination_url, expires_at)
        VALUES ($1, $2, $3, TRUE, 'https://shop.example.com/spring', $4)
        RETURNING id
        "#,
    )
    .bind(campaign_id)
    .bind(affiliate_id)
    .bind(code)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Inserts an already approved USD conversion and credits the link.
pub async fn create_approved_conversion(
    pool: &PgPool,
    link_id: i64,
    campaign_id: i64,
    affiliate_id: i64,
    order_id: &str,
    commission: Decimal,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO conversions
            (link_id, campaign_id, affiliate_id, order_id, sale_amount, commission, currency,
             status, approved_at, reviewed_by)
        VALUES ($1, $2, $3, $4, $5 * 10, $5, 'USD', 'APPROVED', NOW(), 1)
        RETURNING id
        "#,
    )
    .bind(link_id)
    .bind(campaign_id)
    .bind(affiliate_id)
    .bind(order_id)
    .bind(commission)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Stores a token for `actor_id` and returns its raw value.
pub async fn create_test_token(pool: &PgPool, name: &str, actor_id: i64, role: &str) -> String {
    let raw = format!("raw-{name}");
    sqlx::query("INSERT INTO api_tokens (name, token_hash, actor_id, role) VALUES ($1, $2, $3, $4)")
        .bind(name)
        .bind(hash_token(TOKEN_SECRET, &raw))
        .bind(actor_id)
        .bind(role)
        .execute(pool)
        .await
        .unwrap();
    raw
}

pub async fn count_clicks(pool: &PgPool, link_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM clicks WHERE link_id = $1")
        .bind(link_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Supplies `ConnectInfo` the way `into_make_service_with_connect_info` does.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
