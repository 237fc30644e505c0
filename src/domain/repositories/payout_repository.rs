//! Repository trait for earnings sums and payment requests.

use crate::domain::entities::{
    PaymentSettlement, NewPaymentRequest, PaymentRequest, PaymentStatus,
};
use crate::domain::ledger::AffiliateLedger;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the payout side of the ledger.
///
/// Creation and completion of payment requests serialise per affiliate, so
/// balance checks and conversion claims never race each other.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgPayoutRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_payout.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayoutRepository: Send + Sync {
    /// Sums an affiliate's conversions and payment requests in one currency.
    ///
    /// `from`/`to` bound conversion time and request time (half-open); `None`
    /// leaves that side open.
    async fn ledger(
        &self,
        affiliate_id: i64,
        currency: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<AffiliateLedger, AppError>;

    /// Persists a `PENDING` request if the all-time available balance covers it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InsufficientBalance`] if the amount exceeds the
    /// balance seen inside the locked transaction.
    async fn create_request(
        &self,
        new_request: NewPaymentRequest,
    ) -> Result<PaymentRequest, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentRequest>, AppError>;

    /// Moves a request to `PROCESSING` or `FAILED`.
    ///
    /// Conditional on the stored status being one of the legal predecessors
    /// of `to`. Returns `Ok(None)` when no row matched.
    async fn transition(
        &self,
        id: i64,
        to: PaymentStatus,
        actor_id: i64,
        failure_reason: Option<String>,
    ) -> Result<Option<PaymentRequest>, AppError>;

    /// Completes a `PROCESSING` request and claims the conversions it pays.
    ///
    /// Returns `Ok(None)` when the request is missing or not `PROCESSING`.
    async fn complete(
        &self,
        id: i64,
        transaction_id: &str,
        actor_id: i64,
    ) -> Result<Option<PaymentSettlement>, AppError>;

    /// Lists an affiliate's requests, newest first.
    async fn list_by_affiliate(
        &self,
        affiliate_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<PaymentRequest>, AppError>;

    async fn count_by_affiliate(&self, affiliate_id: i64) -> Result<i64, AppError>;
}
