//! Repository trait for conversions and their review lifecycle.

use crate::domain::entities::{AttributionOutcome, Conversion, ConversionStatus, NewConversion};
use crate::error::AppError;
use async_trait::async_trait;

/// Filter for listing conversions.
///
/// Uses builder pattern for convenient construction:
///
/// ```ignore
/// let filter = ConversionFilter::new(1, 25)
///     .with_status(ConversionStatus::Pending)
///     .with_campaign(42);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionFilter {
    pub status: Option<ConversionStatus>,
    pub campaign_id: Option<i64>,
    pub affiliate_id: Option<i64>,
    pub page: i64,
    pub page_size: i64,
}

impl ConversionFilter {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ConversionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_campaign(mut self, campaign_id: i64) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    pub fn with_affiliate(mut self, affiliate_id: i64) -> Self {
        self.affiliate_id = Some(affiliate_id);
        self
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.page_size
    }
}

/// Repository interface for conversions.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgConversionRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_conversion.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversionRepository: Send + Sync {
    /// Inserts a `PENDING` conversion unless `(campaign_id, order_id)` is taken.
    ///
    /// On insert, link and campaign conversion/revenue/commission counters are
    /// bumped in the same transaction. If the pair already exists the stored
    /// conversion is returned with `duplicate = true` and nothing is written.
    async fn create_if_absent(
        &self,
        new_conversion: NewConversion,
    ) -> Result<AttributionOutcome, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Conversion>, AppError>;

    /// `PENDING -> APPROVED`, conditional on the row still being `PENDING`.
    ///
    /// Returns `Ok(None)` when no row matched.
    async fn approve(&self, id: i64, reviewer_id: i64) -> Result<Option<Conversion>, AppError>;

    /// `PENDING -> REJECTED`, conditional on the row still being `PENDING`.
    ///
    /// Reverses the revenue, commission and earnings added at creation in the
    /// same transaction. Returns `Ok(None)` when no row matched.
    async fn reject(
        &self,
        id: i64,
        reviewer_id: i64,
        reason: &str,
    ) -> Result<Option<Conversion>, AppError>;

    /// Lists conversions matching `filter`, newest first.
    async fn list(&self, filter: ConversionFilter) -> Result<Vec<Conversion>, AppError>;

    /// Counts conversions matching `filter` (pagination ignored).
    async fn count(&self, filter: ConversionFilter) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder() {
        let filter = ConversionFilter::new(3, 20)
            .with_status(ConversionStatus::Pending)
            .with_campaign(4)
            .with_affiliate(9);

        assert_eq!(filter.status, Some(ConversionStatus::Pending));
        assert_eq!(filter.campaign_id, Some(4));
        assert_eq!(filter.affiliate_id, Some(9));
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn test_offset_never_negative() {
        assert_eq!(ConversionFilter::new(0, 10).offset(), 0);
    }
}
