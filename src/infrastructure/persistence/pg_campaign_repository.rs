//! PostgreSQL implementation of campaign repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::CampaignRow;
use crate::domain::entities::{Campaign, CampaignStatus, NewCampaign};
use crate::domain::repositories::{CampaignActivity, CampaignRepository};
use crate::error::AppError;

pub struct PgCampaignRepository {
    pool: Arc<PgPool>,
}

impl PgCampaignRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn create(&self, new_campaign: NewCampaign) -> Result<Campaign, AppError> {
        let row = sqlx::query_as!(
            CampaignRow,
            r#"
            INSERT INTO campaigns
                (creator_id, name, landing_url, commission_type, commission_value, currency,
                 starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, creator_id, name, landing_url, commission_type, commission_value,
                      currency, status, starts_at, ends_at, total_clicks, total_conversions,
                      total_revenue, total_commission, created_at, updated_at
            "#,
            new_campaign.creator_id,
            new_campaign.name,
            new_campaign.landing_url,
            new_campaign.commission.kind(),
            new_campaign.commission.value(),
            new_campaign.currency,
            new_campaign.starts_at,
            new_campaign.ends_at
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>, AppError> {
        let row = sqlx::query_as!(
            CampaignRow,
            r#"
            SELECT id, creator_id, name, landing_url, commission_type, commission_value,
                   currency, status, starts_at, ends_at, total_clicks, total_conversions,
                   total_revenue, total_commission, created_at, updated_at
            FROM campaigns
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Campaign::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: i64,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> Result<Option<Campaign>, AppError> {
        let row = sqlx::query_as!(
            CampaignRow,
            r#"
            UPDATE campaigns
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, creator_id, name, landing_url, commission_type, commission_value,
                      currency, status, starts_at, ends_at, total_clicks, total_conversions,
                      total_revenue, total_commission, created_at, updated_at
            "#,
            id,
            from.as_str(),
            to.as_str()
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Campaign::try_from).transpose()
    }

    async fn activity_between(
        &self,
        campaign_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<CampaignActivity, AppError> {
        let row = sqlx::query!(
            r#"
            SELECT
                (SELECT COUNT(*)
                   FROM clicks k
                   JOIN affiliate_links l ON l.id = k.link_id
                  WHERE l.campaign_id = $1
                    AND k.clicked_at >= $2 AND k.clicked_at < $3) AS "clicks!",
                COUNT(v.id) AS "conversions!",
                COALESCE(SUM(v.sale_amount), 0) AS "revenue!",
                COALESCE(SUM(v.commission), 0) AS "commission!"
            FROM conversions v
            WHERE v.campaign_id = $1
              AND v.status <> 'REJECTED'
              AND v.converted_at >= $2 AND v.converted_at < $3
            "#,
            campaign_id,
            from,
            to
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(CampaignActivity {
            clicks: row.clicks,
            conversions: row.conversions,
            revenue: row.revenue,
            commission: row.commission,
        })
    }
}
