//! Repository trait for API token authentication.

use crate::domain::entities::Role;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// API token entity with metadata.
///
/// Tokens are stored as HMAC-SHA256 digests, never in clear.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    pub actor_id: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Repository interface for API token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_token.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Looks up a non-revoked token by digest.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ApiToken))` if the token exists and is not revoked
    /// - `Ok(None)` otherwise
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError>;

    /// Updates the last_used timestamp for a token.
    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// Creates a new API token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name or digest already exists.
    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        actor_id: i64,
        role: Role,
    ) -> Result<ApiToken, AppError>;

    /// Lists all tokens, revoked ones included.
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError>;

    /// Revokes a token, preventing further authentication.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the token does not exist or is
    /// already revoked.
    async fn revoke_token(&self, id: i64) -> Result<(), AppError>;
}
