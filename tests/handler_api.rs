mod common;

use affiliate_tracker::AppState;
use affiliate_tracker::api::handlers::{click_handler, health_handler};
use affiliate_tracker::api::middleware::auth;
use affiliate_tracker::api::routes::protected_routes;
use axum::{Router, middleware, routing::get};
use axum_test::TestServer;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use sqlx::PgPool;

const ADMIN: i64 = 1;
const MERCHANT: i64 = 7;
const AFFILIATE: i64 = 42;

fn app(state: AppState) -> Router {
    let api = protected_routes().route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/track/click/{code}", get(click_handler))
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(common::MockConnectInfoLayer)
        .with_state(state)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

struct Tokens {
    admin: String,
    merchant: String,
    affiliate: String,
}

async fn tokens(pool: &PgPool) -> Tokens {
    Tokens {
        admin: common::create_test_token(pool, "ops", ADMIN, "admin").await,
        merchant: common::create_test_token(pool, "merchant", MERCHANT, "merchant").await,
        affiliate: common::create_test_token(pool, "affiliate", AFFILIATE, "affiliate").await,
    }
}

#[sqlx::test]
async fn test_health_endpoint(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = TestServer::new(app(state)).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
}

#[sqlx::test]
async fn test_api_requires_token(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = TestServer::new(app(state)).unwrap();

    let response = server.get("/api/campaigns/1").await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .get("/api/campaigns/1")
        .authorization_bearer("not-a-real-token")
        .await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(response.json::<Value>()["error"]["code"], "unauthorized");
}

#[sqlx::test]
async fn test_revoked_token_rejected(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = TestServer::new(app(state)).unwrap();
    let raw = common::create_test_token(&pool, "old", ADMIN, "admin").await;

    sqlx::query("UPDATE api_tokens SET revoked_at = NOW() WHERE name = 'old'")
        .execute(&pool)
        .await
        .unwrap();

    let response = server.get("/api/campaigns/1").authorization_bearer(&raw).await;
    assert_eq!(response.status_code(), 401);
}

#[sqlx::test]
async fn test_role_checks(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = TestServer::new(app(state)).unwrap();
    let tokens = tokens(&pool).await;

    let campaign = json!({
        "name": "Spring",
        "landing_url": "https://shop.example.com",
        "commission": { "type": "PERCENTAGE", "rate": "10" }
    });

    let response = server
        .post("/api/campaigns")
        .authorization_bearer(&tokens.affiliate)
        .json(&campaign)
        .await;
    assert_eq!(response.status_code(), 403);

    let response = server
        .post("/api/campaigns")
        .authorization_bearer(&tokens.merchant)
        .json(&campaign)
        .await;
    assert_eq!(response.status_code(), 403);

    // Affiliates may only read their own ledger.
    let response = server
        .get("/api/affiliates/99/earnings")
        .authorization_bearer(&tokens.affiliate)
        .await;
    assert_eq!(response.status_code(), 403);

    let response = server
        .get(&format!("/api/affiliates/{AFFILIATE}/earnings"))
        .authorization_bearer(&tokens.affiliate)
        .await;
    response.assert_status_ok();
}

#[sqlx::test]
async fn test_campaign_to_payout_flow(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = TestServer::new(app(state)).unwrap();
    let tokens = tokens(&pool).await;

    // Admin creates and activates a 10% campaign.
    let response = server
        .post("/api/campaigns")
        .authorization_bearer(&tokens.admin)
        .json(&json!({
            "name": "Spring",
            "landing_url": "https://shop.example.com/spring",
            "commission": { "type": "PERCENTAGE", "rate": "10" }
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    let campaign = response.json::<Value>();
    assert_eq!(campaign["status"], "DRAFT");
    let campaign_id = campaign["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/api/campaigns/{campaign_id}/status"))
        .authorization_bearer(&tokens.admin)
        .json(&json!({ "status": "ACTIVE" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ACTIVE");

    // Affiliate gets a generated link; asking again returns the same one.
    let response = server
        .post("/api/links")
        .authorization_bearer(&tokens.affiliate)
        .json(&json!({ "campaign_id": campaign_id }))
        .await;
    assert_eq!(response.status_code(), 201);
    let link = response.json::<Value>();
    let code = link["tracking_code"].as_str().unwrap().to_string();
    assert_eq!(link["affiliate_id"], AFFILIATE);
    assert_eq!(link["tracking_path"], format!("/track/click/{code}"));

    let response = server
        .post("/api/links")
        .authorization_bearer(&tokens.affiliate)
        .json(&json!({ "campaign_id": campaign_id }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["tracking_code"], code.as_str());

    // Visitor clicks; the cookie carries the attribution reference.
    let response = server.get(&format!("/track/click/{code}")).await;
    assert_eq!(response.status_code(), 302);
    let cookie = response.header("set-cookie").to_str().unwrap().to_string();
    let attribution_ref = cookie
        .strip_prefix("aff_ref=")
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .to_string();

    // Merchant reports the order twice.
    let order = json!({
        "order_id": "ORD-1001",
        "sale_amount": "1000.00",
        "attribution_ref": attribution_ref,
    });

    let response = server
        .post("/api/conversions")
        .authorization_bearer(&tokens.merchant)
        .json(&order)
        .await;
    assert_eq!(response.status_code(), 201);
    let attributed = response.json::<Value>();
    assert_eq!(attributed["duplicate"], false);
    assert_eq!(decimal(&attributed["commission"]), Decimal::new(10000, 2));
    assert_eq!(attributed["conversion"]["sale_amount"], "1000.00");
    let conversion_id = attributed["conversion"]["id"].as_i64().unwrap();

    let response = server
        .post("/api/conversions")
        .authorization_bearer(&tokens.merchant)
        .json(&order)
        .await;
    response.assert_status_ok();
    let repeated = response.json::<Value>();
    assert_eq!(repeated["duplicate"], true);
    assert_eq!(repeated["conversion"]["id"], conversion_id);

    // Pending commission is not withdrawable yet.
    let period_start = "2020-01-01T00:00:00Z";
    let period_end = "2100-01-01T00:00:00Z";
    let request = json!({
        "amount": "60.00",
        "currency": "USD",
        "period_start": period_start,
        "period_end": period_end,
    });

    let response = server
        .post("/api/payment-requests")
        .authorization_bearer(&tokens.affiliate)
        .json(&request)
        .await;
    assert_eq!(response.status_code(), 422);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "insufficient_balance"
    );

    let response = server
        .post(&format!("/api/conversions/{conversion_id}/approve"))
        .authorization_bearer(&tokens.admin)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "APPROVED");

    let response = server
        .post(&format!("/api/conversions/{conversion_id}/approve"))
        .authorization_bearer(&tokens.admin)
        .await;
    assert_eq!(response.status_code(), 409);

    // Withdraw 60 of the 100 approved.
    let response = server
        .post("/api/payment-requests")
        .authorization_bearer(&tokens.affiliate)
        .json(&request)
        .await;
    assert_eq!(response.status_code(), 201);
    let payment_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .get(&format!("/api/affiliates/{AFFILIATE}/earnings"))
        .authorization_bearer(&tokens.affiliate)
        .await;
    let earnings = response.json::<Value>();
    assert_eq!(decimal(&earnings["approved_earnings"]), Decimal::new(100, 0));
    assert_eq!(
        decimal(&earnings["available_for_withdrawal"]),
        Decimal::new(40, 0)
    );

    // Completing straight from PENDING is not a legal transition.
    let response = server
        .post(&format!("/api/payment-requests/{payment_id}/process"))
        .authorization_bearer(&tokens.admin)
        .json(&json!({ "status": "COMPLETED", "transaction_id": "tx_1" }))
        .await;
    assert_eq!(response.status_code(), 409);

    let response = server
        .post(&format!("/api/payment-requests/{payment_id}/process"))
        .authorization_bearer(&tokens.admin)
        .json(&json!({ "status": "PROCESSING" }))
        .await;
    response.assert_status_ok();

    let response = server
        .post(&format!("/api/payment-requests/{payment_id}/process"))
        .authorization_bearer(&tokens.admin)
        .json(&json!({ "status": "COMPLETED", "transaction_id": "tx_1" }))
        .await;
    response.assert_status_ok();
    let settled = response.json::<Value>();
    assert_eq!(settled["request"]["status"], "COMPLETED");
    assert_eq!(settled["request"]["transaction_id"], "tx_1");

    let response = server
        .get(&format!("/api/affiliates/{AFFILIATE}/earnings"))
        .authorization_bearer(&tokens.affiliate)
        .await;
    let earnings = response.json::<Value>();
    assert_eq!(decimal(&earnings["paid_earnings"]), Decimal::new(60, 0));
    assert_eq!(
        decimal(&earnings["available_for_withdrawal"]),
        Decimal::new(40, 0)
    );
    assert_eq!(earnings["paid_earnings"], "60.00");

    let response = server
        .get(&format!("/api/affiliates/{AFFILIATE}/payment-requests"))
        .authorization_bearer(&tokens.affiliate)
        .await;
    response.assert_status_ok();
    let history = response.json::<Value>();
    assert_eq!(history["pagination"]["total_items"], 1);

    // Merchant sees the campaign figures.
    let response = server
        .get(&format!("/api/campaigns/{campaign_id}/stats"))
        .authorization_bearer(&tokens.merchant)
        .await;
    response.assert_status_ok();
    let stats = response.json::<Value>();
    assert_eq!(stats["clicks"], 1);
    assert_eq!(stats["conversions"], 1);
    assert_eq!(decimal(&stats["revenue"]), Decimal::new(1000, 0));
}
