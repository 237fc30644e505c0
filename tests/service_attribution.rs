mod common;

use affiliate_tracker::application::services::AttributeOrder;
use affiliate_tracker::domain::entities::RequestMetadata;
use affiliate_tracker::error::{AppError, LinkUnavailable};
use rust_decimal::Decimal;
use sqlx::PgPool;

fn order(order_id: &str, attribution_ref: &str) -> AttributeOrder {
    AttributeOrder {
        order_id: order_id.to_string(),
        sale_amount: Decimal::new(25000, 2),
        attribution_ref: attribution_ref.to_string(),
        currency: None,
        conversion_type: None,
        customer_email: Some("buyer@example.com".to_string()),
    }
}

#[sqlx::test]
async fn test_click_token_attributes_to_click(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(8, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "attr42").await;

    let receipt = state
        .click_service
        .record_click("attr42", RequestMetadata::default())
        .await
        .unwrap();
    assert_eq!(receipt.link_id, link_id);

    let result = state
        .attribution_service
        .attribute(order("ORD-77", &receipt.attribution_token))
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.duplicate);
    assert_eq!(result.commission, Decimal::new(2000, 2));
    assert_eq!(result.conversion.click_id, Some(receipt.click_id));
    assert_eq!(result.conversion.affiliate_id, 42);
    assert_eq!(result.conversion.currency, "USD");
    assert_eq!(result.conversion.conversion_type, "SALE");
}

#[sqlx::test]
async fn test_plain_code_reference(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    common::create_test_link(&pool, campaign_id, 42, "attr42").await;

    let result = state
        .attribution_service
        .attribute(order("ORD-1", "attr42"))
        .await
        .unwrap();

    assert!(result.conversion.click_id.is_none());
    assert_eq!(result.commission, Decimal::new(2500, 2));
}

#[sqlx::test]
async fn test_tampered_token_rejected(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    common::create_test_link(&pool, campaign_id, 42, "attr42").await;

    let receipt = state
        .click_service
        .record_click("attr42", RequestMetadata::default())
        .await
        .unwrap();

    let mut forged = receipt.attribution_token.clone();
    let last = forged.pop().unwrap();
    forged.push(if last == 'A' { 'B' } else { 'A' });

    let result = state
        .attribution_service
        .attribute(order("ORD-1", &forged))
        .await;

    assert!(matches!(result, Err(AppError::Validation { .. })));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[sqlx::test]
async fn test_currency_mismatch_rejected(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    common::create_test_link(&pool, campaign_id, 42, "attr42").await;

    let mut eur = order("ORD-1", "attr42");
    eur.currency = Some("EUR".to_string());

    let result = state.attribution_service.attribute(eur).await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[sqlx::test]
async fn test_paused_campaign_cannot_be_credited(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    common::create_test_link(&pool, campaign_id, 42, "attr42").await;

    let receipt = state
        .click_service
        .record_click("attr42", RequestMetadata::default())
        .await
        .unwrap();

    sqlx::query("UPDATE campaigns SET status = 'PAUSED' WHERE id = $1")
        .bind(campaign_id)
        .execute(&pool)
        .await
        .unwrap();

    let result = state
        .attribution_service
        .attribute(order("ORD-1", &receipt.attribution_token))
        .await;

    assert!(matches!(
        result,
        Err(AppError::LinkUnavailable(LinkUnavailable::CampaignNotActive))
    ));
}

#[sqlx::test]
async fn test_expired_link_click_not_recorded(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_expired_link(&pool, campaign_id, 42, "old42").await;

    let result = state
        .click_service
        .record_click("old42", RequestMetadata::default())
        .await;

    assert!(matches!(
        result,
        Err(AppError::LinkUnavailable(LinkUnavailable::LinkExpired))
    ));
    assert_eq!(common::count_clicks(&pool, link_id).await, 0);
}
