//! DTOs for conversion ingestion and review.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::api::dto::pagination::PaginationParams;
use crate::application::services::{AttributeOrder, AttributionResult};
use crate::domain::commission::round_to_currency;
use crate::domain::entities::{Conversion, ConversionStatus};

/// `POST /api/conversions`
///
/// `attribution_ref` is either the tracking code or the signed token the
/// click endpoint handed to the visitor.
#[derive(Debug, Deserialize, Validate)]
pub struct AttributeConversionRequest {
    #[validate(length(min = 1, max = 128))]
    pub order_id: String,

    pub sale_amount: Decimal,

    #[validate(length(min = 1, max = 512))]
    pub attribution_ref: String,

    pub currency: Option<String>,

    #[validate(length(max = 32))]
    pub conversion_type: Option<String>,

    #[validate(email)]
    pub customer_email: Option<String>,
}

impl From<AttributeConversionRequest> for AttributeOrder {
    fn from(req: AttributeConversionRequest) -> Self {
        Self {
            order_id: req.order_id,
            sale_amount: req.sale_amount,
            attribution_ref: req.attribution_ref,
            currency: req.currency,
            conversion_type: req.conversion_type,
            customer_email: req.customer_email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttributeConversionResponse {
    pub success: bool,
    pub duplicate: bool,
    pub commission: Decimal,
    pub message: String,
    pub conversion: ConversionResponse,
}

impl From<AttributionResult> for AttributeConversionResponse {
    fn from(result: AttributionResult) -> Self {
        Self {
            success: result.success,
            duplicate: result.duplicate,
            commission: round_to_currency(result.commission, &result.conversion.currency),
            message: result.message,
            conversion: result.conversion.into(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectConversionRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// `GET /api/conversions` filters.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct ConversionListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    #[serde(default)]
    pub status: Option<ConversionStatus>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub campaign_id: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub affiliate_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub id: i64,
    pub link_id: i64,
    pub campaign_id: i64,
    pub affiliate_id: i64,
    pub click_id: Option<i64>,
    pub order_id: String,
    pub sale_amount: Decimal,
    pub commission: Decimal,
    pub currency: String,
    pub conversion_type: String,
    pub status: ConversionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<i64>,
    pub converted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_request_id: Option<i64>,
}

impl From<Conversion> for ConversionResponse {
    fn from(c: Conversion) -> Self {
        Self {
            id: c.id,
            link_id: c.link_id,
            campaign_id: c.campaign_id,
            affiliate_id: c.affiliate_id,
            click_id: c.click_id,
            order_id: c.order_id,
            sale_amount: round_to_currency(c.sale_amount, &c.currency),
            commission: round_to_currency(c.commission, &c.currency),
            currency: c.currency,
            conversion_type: c.conversion_type,
            status: c.status,
            rejection_reason: c.rejection_reason,
            reviewed_by: c.reviewed_by,
            converted_at: c.converted_at,
            approved_at: c.approved_at,
            rejected_at: c.rejected_at,
            paid_at: c.paid_at,
            payment_request_id: c.payment_request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_request_accepts_numeric_amount() {
        let json = r#"{"order_id": "A-1001", "sale_amount": 250.00, "attribution_ref": "k3j9x0a1"}"#;
        let req: AttributeConversionRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.sale_amount, Decimal::new(250, 0));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_attribute_request_rejects_bad_email() {
        let json = r#"{
            "order_id": "A-1001",
            "sale_amount": "10",
            "attribution_ref": "k3j9x0a1",
            "customer_email": "not-an-email"
        }"#;
        let req: AttributeConversionRequest = serde_json::from_str(json).unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_reject_reason_length() {
        let empty = RejectConversionRequest {
            reason: String::new(),
        };
        let long = RejectConversionRequest {
            reason: "x".repeat(501),
        };

        assert!(empty.validate().is_err());
        assert!(long.validate().is_err());
    }
}
