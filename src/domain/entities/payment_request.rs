//! Payment (withdrawal) request entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    /// Requests in these states hold a reservation on the affiliate's balance.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// `PENDING → PROCESSING → COMPLETED | FAILED`; a pending request may also fail outright.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Pending, Failed) | (Processing, Completed) | (Processing, Failed)
        )
    }

    /// States a request must be in to move to `next`.
    pub fn predecessors(next: PaymentStatus) -> &'static [PaymentStatus] {
        use PaymentStatus::*;
        match next {
            Pending => &[],
            Processing => &[Pending],
            Completed => &[Processing],
            Failed => &[Pending, Processing],
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(AppError::internal(
                "Unknown payment request status",
                json!({ "status": other }),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub id: i64,
    pub affiliate_id: i64,
    pub amount: Decimal,
    pub currency: String,
    /// Reporting period, half-open `[period_start, period_end)`.
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub processed_by: Option<i64>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentRequest {
    pub affiliate_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// Administrative decision applied to a payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Processing,
    Completed { transaction_id: String },
    Failed { reason: Option<String> },
}

impl PaymentOutcome {
    pub fn target_status(&self) -> PaymentStatus {
        match self {
            Self::Processing => PaymentStatus::Processing,
            Self::Completed { .. } => PaymentStatus::Completed,
            Self::Failed { .. } => PaymentStatus::Failed,
        }
    }
}

/// A processed request together with the conversions it claimed.
///
/// Claims are only ever non-zero for `COMPLETED` requests.
#[derive(Debug, Clone)]
pub struct PaymentSettlement {
    pub request: PaymentRequest,
    pub claimed_conversions: i64,
    pub claimed_commission: Decimal,
}
