//! Repository trait for affiliate links.

use crate::domain::entities::{AffiliateLink, NewAffiliateLink, ResolvedLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for affiliate links.
///
/// Lookups used on the tracking path return a [`ResolvedLink`], i.e. the link
/// joined with the campaign fields needed to decide whether it can be served.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if:
    /// - The tracking code already exists
    /// - A generated link already exists for the campaign and affiliate
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewAffiliateLink) -> Result<AffiliateLink, AppError>;

    /// Checks if a tracking code is already taken.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Finds a link by tracking code, joined with its campaign.
    async fn find_by_code(&self, code: &str) -> Result<Option<ResolvedLink>, AppError>;

    /// Finds a link by id, joined with its campaign.
    async fn find_by_id(&self, id: i64) -> Result<Option<ResolvedLink>, AppError>;

    /// Finds the generated (non-alias) link of an affiliate in a campaign.
    async fn find_generated(
        &self,
        campaign_id: i64,
        affiliate_id: i64,
    ) -> Result<Option<AffiliateLink>, AppError>;

    /// Lists an affiliate's links, newest first.
    ///
    /// # Arguments
    ///
    /// - `page` - Page number (1-indexed)
    /// - `page_size` - Number of items per page
    async fn list_by_affiliate(
        &self,
        affiliate_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<AffiliateLink>, AppError>;

    /// Counts an affiliate's links.
    async fn count_by_affiliate(&self, affiliate_id: i64) -> Result<i64, AppError>;

    /// Enables or disables a link.
    ///
    /// Returns `Ok(None)` if the link does not exist.
    async fn set_active(&self, id: i64, active: bool) -> Result<Option<AffiliateLink>, AppError>;
}
