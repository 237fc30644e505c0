//! Repository trait for campaigns.

use crate::domain::entities::{Campaign, CampaignStatus, NewCampaign};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Raw activity totals for a campaign over a time range.
///
/// Computed from the click log and non-rejected conversions, so it agrees with
/// the stored counters when the range covers the campaign's whole life.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignActivity {
    pub clicks: i64,
    pub conversions: i64,
    pub revenue: Decimal,
    pub commission: Decimal,
}

/// Repository interface for campaign administration and reporting.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCampaignRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Inserts a new campaign in `DRAFT` status.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_campaign: NewCampaign) -> Result<Campaign, AppError>;

    /// Finds a campaign by id, counters included.
    async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>, AppError>;

    /// Moves a campaign from `from` to `to`.
    ///
    /// The write is conditional on the stored status still being `from`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Campaign))` with the updated row
    /// - `Ok(None)` if the campaign is missing or its status changed meanwhile
    async fn update_status(
        &self,
        id: i64,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> Result<Option<Campaign>, AppError>;

    /// Aggregates clicks and non-rejected conversions in `[from, to)`.
    async fn activity_between(
        &self,
        campaign_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<CampaignActivity, AppError>;
}
