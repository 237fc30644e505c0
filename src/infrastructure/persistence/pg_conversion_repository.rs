//! PostgreSQL implementation of conversion repository.
//!
//! Counter updates on `affiliate_links` and `campaigns` run in the same
//! transaction as the conversion write and always lock the link row first.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{ConversionRow, collect};
use crate::domain::entities::{AttributionOutcome, Conversion, NewConversion};
use crate::domain::repositories::{ConversionFilter, ConversionRepository};
use crate::error::AppError;

pub struct PgConversionRepository {
    pool: Arc<PgPool>,
}

impl PgConversionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversionRepository for PgConversionRepository {
    async fn create_if_absent(
        &self,
        new_conversion: NewConversion,
    ) -> Result<AttributionOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as!(
            ConversionRow,
            r#"
            INSERT INTO conversions
                (link_id, campaign_id, affiliate_id, click_id, order_id, sale_amount,
                 commission, currency, conversion_type, customer_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (campaign_id, order_id) DO NOTHING
            RETURNING id, link_id, campaign_id, affiliate_id, click_id, order_id, sale_amount,
                      commission, currency, conversion_type, customer_email, status,
                      rejection_reason, reviewed_by, converted_at, approved_at, rejected_at,
                      paid_at, payment_request_id
            "#,
            new_conversion.link_id,
            new_conversion.campaign_id,
            new_conversion.affiliate_id,
            new_conversion.click_id,
            new_conversion.order_id,
            new_conversion.sale_amount,
            new_conversion.commission,
            new_conversion.currency,
            new_conversion.conversion_type,
            new_conversion.customer_email.as_deref()
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = inserted else {
            tx.rollback().await?;

            let row = sqlx::query_as!(
                ConversionRow,
                r#"
                SELECT id, link_id, campaign_id, affiliate_id, click_id, order_id, sale_amount,
                       commission, currency, conversion_type, customer_email, status,
                       rejection_reason, reviewed_by, converted_at, approved_at, rejected_at,
                       paid_at, payment_request_id
                FROM conversions
                WHERE campaign_id = $1 AND order_id = $2
                "#,
                new_conversion.campaign_id,
                new_conversion.order_id
            )
            .fetch_optional(self.pool.as_ref())
            .await?;

            let row = row.ok_or_else(|| {
                AppError::internal(
                    "Conflicting conversion disappeared",
                    json!({ "order_id": new_conversion.order_id }),
                )
            })?;

            return Ok(AttributionOutcome {
                conversion: row.try_into()?,
                duplicate: true,
            });
        };

        sqlx::query!(
            r#"
            UPDATE affiliate_links
            SET conversions = conversions + 1, earnings = earnings + $2
            WHERE id = $1
            "#,
            new_conversion.link_id,
            new_conversion.commission
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query!(
            r#"
            UPDATE campaigns
            SET total_conversions = total_conversions + 1,
                total_revenue = total_revenue + $2,
                total_commission = total_commission + $3
            WHERE id = $1
            "#,
            new_conversion.campaign_id,
            new_conversion.sale_amount,
            new_conversion.commission
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AttributionOutcome {
            conversion: row.try_into()?,
            duplicate: false,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Conversion>, AppError> {
        let row = sqlx::query_as!(
            ConversionRow,
            r#"
            SELECT id, link_id, campaign_id, affiliate_id, click_id, order_id, sale_amount,
                   commission, currency, conversion_type, customer_email, status,
                   rejection_reason, reviewed_by, converted_at, approved_at, rejected_at,
                   paid_at, payment_request_id
            FROM conversions
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Conversion::try_from).transpose()
    }

    async fn approve(&self, id: i64, reviewer_id: i64) -> Result<Option<Conversion>, AppError> {
        let row = sqlx::query_as!(
            ConversionRow,
            r#"
            UPDATE conversions
            SET status = 'APPROVED', approved_at = NOW(), reviewed_by = $2
            WHERE id = $1 AND status = 'PENDING'
            RETURNING id, link_id, campaign_id, affiliate_id, click_id, order_id, sale_amount,
                      commission, currency, conversion_type, customer_email, status,
                      rejection_reason, reviewed_by, converted_at, approved_at, rejected_at,
                      paid_at, payment_request_id
            "#,
            id,
            reviewer_id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Conversion::try_from).transpose()
    }

    async fn reject(
        &self,
        id: i64,
        reviewer_id: i64,
        reason: &str,
    ) -> Result<Option<Conversion>, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as!(
            ConversionRow,
            r#"
            UPDATE conversions
            SET status = 'REJECTED', rejected_at = NOW(), reviewed_by = $2, rejection_reason = $3
            WHERE id = $1 AND status = 'PENDING'
            RETURNING id, link_id, campaign_id, affiliate_id, click_id, order_id, sale_amount,
                      commission, currency, conversion_type, customer_email, status,
                      rejection_reason, reviewed_by, converted_at, approved_at, rejected_at,
                      paid_at, payment_request_id
            "#,
            id,
            reviewer_id,
            reason
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let conversion = Conversion::try_from(row)?;

        // Conversion counts stay; only the money is reversed.
        sqlx::query!(
            "UPDATE affiliate_links SET earnings = earnings - $2 WHERE id = $1",
            conversion.link_id,
            conversion.commission
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query!(
            r#"
            UPDATE campaigns
            SET total_revenue = total_revenue - $2,
                total_commission = total_commission - $3
            WHERE id = $1
            "#,
            conversion.campaign_id,
            conversion.sale_amount,
            conversion.commission
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(conversion))
    }

    async fn list(&self, filter: ConversionFilter) -> Result<Vec<Conversion>, AppError> {
        let rows = sqlx::query_as!(
            ConversionRow,
            r#"
            SELECT id, link_id, campaign_id, affiliate_id, click_id, order_id, sale_amount,
                   commission, currency, conversion_type, customer_email, status,
                   rejection_reason, reviewed_by, converted_at, approved_at, rejected_at,
                   paid_at, payment_request_id
            FROM conversions
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::bigint IS NULL OR campaign_id = $2)
              AND ($3::bigint IS NULL OR affiliate_id = $3)
            ORDER BY converted_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
            filter.status.map(|s| s.as_str()),
            filter.campaign_id,
            filter.affiliate_id,
            filter.page_size,
            filter.offset()
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        collect(rows)
    }

    async fn count(&self, filter: ConversionFilter) -> Result<i64, AppError> {
        let count = sqlx::query_scalar!(
            r#"
            SELECT COUNT(*) AS "count!"
            FROM conversions
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::bigint IS NULL OR campaign_id = $2)
              AND ($3::bigint IS NULL OR affiliate_id = $3)
            "#,
            filter.status.map(|s| s.as_str()),
            filter.campaign_id,
            filter.affiliate_id
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
