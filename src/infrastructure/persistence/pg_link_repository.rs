//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{LinkRow, ResolvedLinkRow};
use crate::domain::entities::{AffiliateLink, NewAffiliateLink, ResolvedLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for affiliate links.
///
/// Tracking-path lookups join `campaigns` so the resolver gets the campaign
/// state in the same round trip.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewAffiliateLink) -> Result<AffiliateLink, AppError> {
        let row = sqlx::query_as!(
            LinkRow,
            r#"
            INSERT INTO affiliate_links
                (campaign_id, affiliate_id, tracking_code, is_custom, destination_url, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, campaign_id, affiliate_id, tracking_code, is_custom, destination_url,
                      is_active, expires_at, clicks, conversions, earnings, created_at
            "#,
            new_link.campaign_id,
            new_link.affiliate_id,
            new_link.tracking_code,
            new_link.is_custom,
            new_link.destination_url,
            new_link.expires_at
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar!(
            r#"SELECT EXISTS (SELECT 1 FROM affiliate_links WHERE tracking_code = $1) AS "exists!""#,
            code
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ResolvedLink>, AppError> {
        let row = sqlx::query_as!(
            ResolvedLinkRow,
            r#"
            SELECT l.id, l.campaign_id, l.affiliate_id, l.tracking_code, l.is_custom,
                   l.destination_url, l.is_active, l.expires_at, l.clicks, l.conversions,
                   l.earnings, l.created_at,
                   c.status AS campaign_status, c.commission_type, c.commission_value,
                   c.currency AS campaign_currency, c.starts_at AS campaign_starts_at,
                   c.ends_at AS campaign_ends_at
            FROM affiliate_links l
            JOIN campaigns c ON c.id = l.campaign_id
            WHERE l.tracking_code = $1
            "#,
            code
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ResolvedLink::try_from).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ResolvedLink>, AppError> {
        let row = sqlx::query_as!(
            ResolvedLinkRow,
            r#"
            SELECT l.id, l.campaign_id, l.affiliate_id, l.tracking_code, l.is_custom,
                   l.destination_url, l.is_active, l.expires_at, l.clicks, l.conversions,
                   l.earnings, l.created_at,
                   c.status AS campaign_status, c.commission_type, c.commission_value,
                   c.currency AS campaign_currency, c.starts_at AS campaign_starts_at,
                   c.ends_at AS campaign_ends_at
            FROM affiliate_links l
            JOIN campaigns c ON c.id = l.campaign_id
            WHERE l.id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ResolvedLink::try_from).transpose()
    }

    async fn find_generated(
        &self,
        campaign_id: i64,
        affiliate_id: i64,
    ) -> Result<Option<AffiliateLink>, AppError> {
        let row = sqlx::query_as!(
            LinkRow,
            r#"
            SELECT id, campaign_id, affiliate_id, tracking_code, is_custom, destination_url,
                   is_active, expires_at, clicks, conversions, earnings, created_at
            FROM affiliate_links
            WHERE campaign_id = $1 AND affiliate_id = $2 AND NOT is_custom
            "#,
            campaign_id,
            affiliate_id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_affiliate(
        &self,
        affiliate_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<AffiliateLink>, AppError> {
        let offset = (page - 1).max(0) * page_size;

        let rows = sqlx::query_as!(
            LinkRow,
            r#"
            SELECT id, campaign_id, affiliate_id, tracking_code, is_custom, destination_url,
                   is_active, expires_at, clicks, conversions, earnings, created_at
            FROM affiliate_links
            WHERE affiliate_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            affiliate_id,
            page_size,
            offset
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_affiliate(&self, affiliate_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar!(
            r#"SELECT COUNT(*) AS "count!" FROM affiliate_links WHERE affiliate_id = $1"#,
            affiliate_id
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<Option<AffiliateLink>, AppError> {
        let row = sqlx::query_as!(
            LinkRow,
            r#"
            UPDATE affiliate_links
            SET is_active = $2
            WHERE id = $1
            RETURNING id, campaign_id, affiliate_id, tracking_code, is_custom, destination_url,
                      is_active, expires_at, clicks, conversions, earnings, created_at
            "#,
            id,
            active
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }
}
