//! Conversion entity: an attributed, commission-bearing sale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Review state of a conversion.
///
/// `PENDING` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionStatus {
    Pending,
    Approved,
    Rejected,
}

impl ConversionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn can_transition_to(&self, next: ConversionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(AppError::internal(
                "Unknown conversion status",
                json!({ "status": other }),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub id: i64,
    pub link_id: i64,
    pub campaign_id: i64,
    pub affiliate_id: i64,
    pub click_id: Option<i64>,
    pub order_id: String,
    pub sale_amount: Decimal,
    /// Fixed at creation from the campaign snapshot; never recomputed.
    pub commission: Decimal,
    pub currency: String,
    pub conversion_type: String,
    pub customer_email: Option<String>,
    pub status: ConversionStatus,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<i64>,
    pub converted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_request_id: Option<i64>,
}

impl Conversion {
    /// Approved and not yet claimed by a completed payment request.
    pub fn is_payable(&self) -> bool {
        self.status == ConversionStatus::Approved && self.paid_at.is_none()
    }
}

/// Input data for a new `PENDING` conversion.
#[derive(Debug, Clone)]
pub struct NewConversion {
    pub link_id: i64,
    pub campaign_id: i64,
    pub affiliate_id: i64,
    pub click_id: Option<i64>,
    pub order_id: String,
    pub sale_amount: Decimal,
    pub commission: Decimal,
    pub currency: String,
    pub conversion_type: String,
    pub customer_email: Option<String>,
}

/// Result of an attribution attempt.
///
/// `duplicate` is true when the `(campaign_id, order_id)` pair had already been
/// credited; `conversion` is then the original row, untouched.
#[derive(Debug, Clone)]
pub struct AttributionOutcome {
    pub conversion: Conversion,
    pub duplicate: bool,
}
