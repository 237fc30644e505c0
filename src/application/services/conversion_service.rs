//! Conversion review lifecycle: `PENDING -> APPROVED | REJECTED`.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Conversion, ConversionStatus};
use crate::domain::repositories::{ConversionFilter, ConversionRepository};
use crate::error::AppError;

const MAX_REASON_LEN: usize = 500;

/// Applies review decisions to conversions.
///
/// Transitions are conditional writes in the store. When one matches no row
/// the conversion is re-read only to tell a missing id from a stale state.
pub struct ConversionService<V: ConversionRepository> {
    repository: Arc<V>,
}

impl<V: ConversionRepository> ConversionService<V> {
    pub fn new(repository: Arc<V>) -> Self {
        Self { repository }
    }

    /// Approves a pending conversion.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the conversion does not exist.
    /// Returns [`AppError::InvalidState`] if it is no longer `PENDING`.
    pub async fn approve(&self, id: i64, reviewer_id: i64) -> Result<Conversion, AppError> {
        match self.repository.approve(id, reviewer_id).await? {
            Some(conversion) => {
                metrics::counter!("conversions_reviewed_total", "status" => "APPROVED")
                    .increment(1);
                tracing::info!(conversion_id = id, reviewer_id, "Conversion approved");
                Ok(conversion)
            }
            None => Err(self.rejected_transition(id, ConversionStatus::Approved).await),
        }
    }

    /// Rejects a pending conversion and reverses its counter contributions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `reason` is blank or too long.
    /// Returns [`AppError::NotFound`] if the conversion does not exist.
    /// Returns [`AppError::InvalidState`] if it is no longer `PENDING`.
    pub async fn reject(
        &self,
        id: i64,
        reviewer_id: i64,
        reason: &str,
    ) -> Result<Conversion, AppError> {
        let reason = reason.trim();
        if reason.is_empty() || reason.chars().count() > MAX_REASON_LEN {
            return Err(AppError::bad_request(
                "Rejection reason must be 1-500 characters",
                json!({ "conversion_id": id }),
            ));
        }

        match self.repository.reject(id, reviewer_id, reason).await? {
            Some(conversion) => {
                metrics::counter!("conversions_reviewed_total", "status" => "REJECTED")
                    .increment(1);
                tracing::info!(conversion_id = id, reviewer_id, "Conversion rejected");
                Ok(conversion)
            }
            None => Err(self.rejected_transition(id, ConversionStatus::Rejected).await),
        }
    }

    pub async fn get(&self, id: i64) -> Result<Conversion, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversion not found", json!({ "conversion_id": id })))
    }

    /// Lists conversions with the total number matching the filter.
    pub async fn list(&self, filter: ConversionFilter) -> Result<(Vec<Conversion>, i64), AppError> {
        let items = self.repository.list(filter.clone()).await?;
        let total = self.repository.count(filter).await?;
        Ok((items, total))
    }

    async fn rejected_transition(&self, id: i64, requested: ConversionStatus) -> AppError {
        match self.repository.find_by_id(id).await {
            Ok(Some(current)) => AppError::invalid_state(
                "Conversion is not pending",
                json!({
                    "conversion_id": id,
                    "status": current.status,
                    "requested": requested,
                }),
            ),
            Ok(None) => AppError::not_found("Conversion not found", json!({ "conversion_id": id })),
            Err(e) => e,
        }
    }
}
