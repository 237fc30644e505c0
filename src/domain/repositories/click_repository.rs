//! Repository trait for the click log.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for recording clicks.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click and bumps the link and campaign click counters.
    ///
    /// All three writes happen in one transaction; counters use in-place
    /// increments so concurrent clicks never lose an update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts clicks stored for a link.
    async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError>;
}
