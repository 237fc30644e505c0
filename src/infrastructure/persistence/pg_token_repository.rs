//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{TokenRow, collect};
use crate::domain::entities::Role;
use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;

/// PostgreSQL repository for API tokens.
///
/// Only keyed HMAC digests are stored; the raw token is shown once at creation.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        let row = sqlx::query_as!(
            TokenRow,
            r#"
            SELECT id, name, token_hash, actor_id, role, created_at, last_used_at, revoked_at
            FROM api_tokens
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
            token_hash
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ApiToken::try_from).transpose()
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query!(
            r#"
            UPDATE api_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
            token_hash
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        actor_id: i64,
        role: Role,
    ) -> Result<ApiToken, AppError> {
        let row = sqlx::query_as!(
            TokenRow,
            r#"
            INSERT INTO api_tokens (name, token_hash, actor_id, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, token_hash, actor_id, role, created_at, last_used_at, revoked_at
            "#,
            name,
            token_hash,
            actor_id,
            role.as_str()
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let rows = sqlx::query_as!(
            TokenRow,
            r#"
            SELECT id, name, token_hash, actor_id, role, created_at, last_used_at, revoked_at
            FROM api_tokens
            ORDER BY created_at DESC
            "#
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        collect(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let row = sqlx::query_as!(
            TokenRow,
            r#"
            SELECT id, name, token_hash, actor_id, role, created_at, last_used_at, revoked_at
            FROM api_tokens
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ApiToken::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let row = sqlx::query_as!(
            TokenRow,
            r#"
            SELECT id, name, token_hash, actor_id, role, created_at, last_used_at, revoked_at
            FROM api_tokens
            WHERE name = $1
            "#,
            name
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ApiToken::try_from).transpose()
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query!(
            r#"
            UPDATE api_tokens
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
            id
        )
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Token not found or already revoked",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }
}
