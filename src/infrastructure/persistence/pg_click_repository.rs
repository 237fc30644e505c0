//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::ClickRow;
use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as!(
            ClickRow,
            r#"
            INSERT INTO clicks
                (link_id, ip, user_agent, referer, device, browser, country, visitor_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, link_id, clicked_at, ip, user_agent, referer, device, browser,
                      country, visitor_id
            "#,
            new_click.link_id,
            new_click.ip.as_deref(),
            new_click.user_agent.as_deref(),
            new_click.referer.as_deref(),
            new_click.device.as_str(),
            new_click.browser.as_str(),
            new_click.country.as_deref(),
            new_click.visitor_id.as_deref()
        )
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query!(
            "UPDATE affiliate_links SET clicks = clicks + 1 WHERE id = $1",
            new_click.link_id
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query!(
            "UPDATE campaigns SET total_clicks = total_clicks + 1 WHERE id = $1",
            new_click.campaign_id
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar!(
            r#"SELECT COUNT(*) AS "count!" FROM clicks WHERE link_id = $1"#,
            link_id
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
