mod common;

use affiliate_tracker::domain::entities::{ConversionStatus, NewConversion};
use affiliate_tracker::domain::repositories::{ConversionFilter, ConversionRepository};
use affiliate_tracker::infrastructure::persistence::PgConversionRepository;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

fn order(link_id: i64, campaign_id: i64, order_id: &str) -> NewConversion {
    NewConversion {
        link_id,
        campaign_id,
        affiliate_id: 42,
        click_id: None,
        order_id: order_id.to_string(),
        sale_amount: Decimal::new(20000, 2),
        commission: Decimal::new(2000, 2),
        currency: "USD".to_string(),
        conversion_type: "SALE".to_string(),
        customer_email: None,
    }
}

async fn counters(pool: &PgPool, link_id: i64) -> (i64, Decimal, i64, Decimal, Decimal) {
    sqlx::query_as(
        r#"
        SELECT l.conversions, l.earnings, c.total_conversions, c.total_revenue, c.total_commission
        FROM affiliate_links l JOIN campaigns c ON c.id = l.campaign_id
        WHERE l.id = $1
        "#,
    )
    .bind(link_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test]
async fn test_create_bumps_counters(pool: PgPool) {
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "conv42").await;
    let repo = PgConversionRepository::new(Arc::new(pool.clone()));

    let outcome = repo
        .create_if_absent(order(link_id, campaign_id, "ORD-1"))
        .await
        .unwrap();

    assert!(!outcome.duplicate);
    assert_eq!(outcome.conversion.status, ConversionStatus::Pending);
    assert_eq!(outcome.conversion.commission, Decimal::new(2000, 2));

    let (conversions, earnings, total_conversions, revenue, commission) =
        counters(&pool, link_id).await;
    assert_eq!(conversions, 1);
    assert_eq!(earnings, Decimal::new(20, 0));
    assert_eq!(total_conversions, 1);
    assert_eq!(revenue, Decimal::new(200, 0));
    assert_eq!(commission, Decimal::new(20, 0));
}

#[sqlx::test]
async fn test_repeated_order_is_idempotent(pool: PgPool) {
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "conv42").await;
    let repo = PgConversionRepository::new(Arc::new(pool.clone()));

    let first = repo
        .create_if_absent(order(link_id, campaign_id, "ORD-1"))
        .await
        .unwrap();

    let mut again = order(link_id, campaign_id, "ORD-1");
    again.sale_amount = Decimal::new(99900, 2);
    let second = repo.create_if_absent(again).await.unwrap();

    assert!(second.duplicate);
    assert_eq!(second.conversion.id, first.conversion.id);
    assert_eq!(second.conversion.sale_amount, Decimal::new(200, 0));

    let (conversions, earnings, ..) = counters(&pool, link_id).await;
    assert_eq!(conversions, 1);
    assert_eq!(earnings, Decimal::new(20, 0));
}

#[sqlx::test]
async fn test_concurrent_duplicates_store_one_row(pool: PgPool) {
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "conv42").await;
    let repo = Arc::new(PgConversionRepository::new(Arc::new(pool.clone())));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create_if_absent(order(link_id, campaign_id, "ORD-RACE"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut fresh = 0;
    for handle in handles {
        if !handle.await.unwrap().duplicate {
            fresh += 1;
        }
    }
    assert_eq!(fresh, 1);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversions WHERE order_id = 'ORD-RACE'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let (conversions, ..) = counters(&pool, link_id).await;
    assert_eq!(conversions, 1);
}

#[sqlx::test]
async fn test_same_order_in_other_campaign_is_distinct(pool: PgPool) {
    let first_campaign = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let second_campaign = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let first_link = common::create_test_link(&pool, first_campaign, 42, "first42").await;
    let second_link = common::create_test_link(&pool, second_campaign, 42, "second42").await;
    let repo = PgConversionRepository::new(Arc::new(pool));

    let a = repo
        .create_if_absent(order(first_link, first_campaign, "ORD-1"))
        .await
        .unwrap();
    let b = repo
        .create_if_absent(order(second_link, second_campaign, "ORD-1"))
        .await
        .unwrap();

    assert!(!a.duplicate);
    assert!(!b.duplicate);
    assert_ne!(a.conversion.id, b.conversion.id);
}

#[sqlx::test]
async fn test_reject_reverses_money_but_keeps_counts(pool: PgPool) {
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "conv42").await;
    let repo = PgConversionRepository::new(Arc::new(pool.clone()));

    let created = repo
        .create_if_absent(order(link_id, campaign_id, "ORD-1"))
        .await
        .unwrap();

    let rejected = repo
        .reject(created.conversion.id, 1, "Order refunded")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(rejected.status, ConversionStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Order refunded"));
    assert_eq!(rejected.reviewed_by, Some(1));
    assert!(rejected.rejected_at.is_some());

    let (conversions, earnings, total_conversions, revenue, commission) =
        counters(&pool, link_id).await;
    assert_eq!(conversions, 1);
    assert_eq!(earnings, Decimal::ZERO);
    assert_eq!(total_conversions, 1);
    assert_eq!(revenue, Decimal::ZERO);
    assert_eq!(commission, Decimal::ZERO);

    // A second review finds nothing pending.
    assert!(repo.reject(created.conversion.id, 1, "again").await.unwrap().is_none());
    assert!(repo.approve(created.conversion.id, 1).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_approve_only_once(pool: PgPool) {
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "conv42").await;
    let repo = PgConversionRepository::new(Arc::new(pool));

    let created = repo
        .create_if_absent(order(link_id, campaign_id, "ORD-1"))
        .await
        .unwrap();

    let approved = repo.approve(created.conversion.id, 1).await.unwrap().unwrap();
    assert_eq!(approved.status, ConversionStatus::Approved);
    assert!(approved.approved_at.is_some());

    assert!(repo.approve(created.conversion.id, 1).await.unwrap().is_none());
    assert!(repo.reject(created.conversion.id, 1, "late").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_list_filters_and_counts(pool: PgPool) {
    let campaign_id = common::create_test_campaign(&pool, "ACTIVE", Decimal::new(10, 0)).await;
    let link_id = common::create_test_link(&pool, campaign_id, 42, "conv42").await;
    let repo = PgConversionRepository::new(Arc::new(pool));

    for i in 0..3 {
        repo.create_if_absent(order(link_id, campaign_id, &format!("ORD-{i}")))
            .await
            .unwrap();
    }
    let first = repo
        .list(ConversionFilter::new(1, 10).with_affiliate(42))
        .await
        .unwrap();
    assert_eq!(first.len(), 3);
    repo.approve(first[0].id, 1).await.unwrap();

    let pending = ConversionFilter::new(1, 10)
        .with_campaign(campaign_id)
        .with_status(ConversionStatus::Pending);
    assert_eq!(repo.count(pending.clone()).await.unwrap(), 2);
    assert_eq!(repo.list(pending).await.unwrap().len(), 2);

    let other = ConversionFilter::new(1, 10).with_affiliate(99);
    assert_eq!(repo.count(other).await.unwrap(), 0);

    let paged = repo.list(ConversionFilter::new(2, 2)).await.unwrap();
    assert_eq!(paged.len(), 1);
}
