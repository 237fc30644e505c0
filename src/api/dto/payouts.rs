//! DTOs for earnings reports and payment requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::pagination::DateFilterParams;
use crate::domain::commission::round_to_currency;
use crate::domain::entities::{PaymentOutcome, PaymentRequest, PaymentSettlement, PaymentStatus};
use crate::domain::ledger::EarningsReport;

/// `GET /api/affiliates/{id}/earnings?currency=USD&from=&to=`
#[derive(Debug, Deserialize)]
pub struct EarningsQuery {
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(flatten)]
    pub range: DateFilterParams,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Serialize)]
pub struct EarningsResponse {
    pub affiliate_id: i64,
    pub currency: String,
    pub total_earnings: Decimal,
    pub approved_earnings: Decimal,
    pub paid_earnings: Decimal,
    pub pending_earnings: Decimal,
    pub available_for_withdrawal: Decimal,
}

impl EarningsResponse {
    pub fn new(affiliate_id: i64, report: EarningsReport) -> Self {
        Self {
            affiliate_id,
            total_earnings: round_to_currency(report.total_earnings, &report.currency),
            approved_earnings: round_to_currency(report.approved_earnings, &report.currency),
            paid_earnings: round_to_currency(report.paid_earnings, &report.currency),
            pending_earnings: round_to_currency(report.pending_earnings, &report.currency),
            available_for_withdrawal: round_to_currency(
                report.available_for_withdrawal,
                &report.currency,
            ),
            currency: report.currency,
        }
    }
}

/// `POST /api/payment-requests`
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequestRequest {
    pub affiliate_id: Option<i64>,

    pub amount: Decimal,

    #[validate(length(equal = 3))]
    pub currency: String,

    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// `POST /api/payment-requests/{id}/process`
///
/// ```json
/// { "status": "COMPLETED", "transaction_id": "tx_2231" }
/// ```
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessPaymentRequest {
    Processing,
    Completed { transaction_id: String },
    Failed { reason: Option<String> },
}

impl From<ProcessPaymentRequest> for PaymentOutcome {
    fn from(req: ProcessPaymentRequest) -> Self {
        match req {
            ProcessPaymentRequest::Processing => Self::Processing,
            ProcessPaymentRequest::Completed { transaction_id } => {
                Self::Completed { transaction_id }
            }
            ProcessPaymentRequest::Failed { reason } => Self::Failed { reason },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentRequestResponse {
    pub id: i64,
    pub affiliate_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub processed_by: Option<i64>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<PaymentRequest> for PaymentRequestResponse {
    fn from(r: PaymentRequest) -> Self {
        Self {
            id: r.id,
            affiliate_id: r.affiliate_id,
            amount: round_to_currency(r.amount, &r.currency),
            currency: r.currency,
            period_start: r.period_start,
            period_end: r.period_end,
            status: r.status,
            transaction_id: r.transaction_id,
            failure_reason: r.failure_reason,
            processed_by: r.processed_by,
            requested_at: r.requested_at,
            processed_at: r.processed_at,
            completed_at: r.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProcessPaymentResponse {
    pub request: PaymentRequestResponse,
    pub claimed_conversions: i64,
    pub claimed_commission: Decimal,
}

impl From<PaymentSettlement> for ProcessPaymentResponse {
    fn from(s: PaymentSettlement) -> Self {
        let claimed_commission = round_to_currency(s.claimed_commission, &s.request.currency);
        Self {
            request: s.request.into(),
            claimed_conversions: s.claimed_conversions,
            claimed_commission,
        }
    }
}
