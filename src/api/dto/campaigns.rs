//! DTOs for campaign administration and reporting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{CampaignStats, CreateCampaign};
use crate::domain::commission::round_to_currency;
use crate::domain::entities::{Campaign, CampaignStatus, CommissionModel};

/// `POST /api/campaigns`
///
/// ```json
/// {
///   "name": "Spring sale",
///   "landing_url": "https://shop.example.com/spring",
///   "commission": { "type": "PERCENTAGE", "rate": "10" },
///   "currency": "USD"
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(url(message = "Invalid URL format"))]
    pub landing_url: String,

    pub commission: CommissionModel,

    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl From<CreateCampaignRequest> for CreateCampaign {
    fn from(req: CreateCampaignRequest) -> Self {
        Self {
            name: req.name,
            landing_url: req.landing_url,
            commission: req.commission,
            currency: req.currency,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignStatusRequest {
    pub status: CampaignStatus,
}

#[derive(Debug, Serialize)]
pub struct CampaignResponse {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub landing_url: String,
    pub commission: CommissionModel,
    pub currency: String,
    pub status: CampaignStatus,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub total_clicks: i64,
    pub total_conversions: i64,
    pub total_revenue: Decimal,
    pub total_commission: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(c: Campaign) -> Self {
        Self {
            id: c.id,
            creator_id: c.creator_id,
            name: c.name,
            landing_url: c.landing_url,
            commission: match c.commission {
                CommissionModel::Percentage { rate } => CommissionModel::Percentage {
                    rate: rate.normalize(),
                },
                CommissionModel::Fixed { amount } => CommissionModel::Fixed {
                    amount: round_to_currency(amount, &c.currency),
                },
            },
            status: c.status,
            starts_at: c.starts_at,
            ends_at: c.ends_at,
            total_clicks: c.counters.clicks,
            total_conversions: c.counters.conversions,
            total_revenue: round_to_currency(c.counters.revenue, &c.currency),
            total_commission: round_to_currency(c.counters.commission, &c.currency),
            currency: c.currency,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// `GET /api/campaigns/{id}/stats`
#[derive(Debug, Serialize)]
pub struct CampaignStatsResponse {
    pub campaign_id: i64,
    pub currency: String,
    pub clicks: i64,
    pub conversions: i64,
    pub revenue: Decimal,
    pub commission: Decimal,
    pub conversion_rate: Decimal,
    pub average_order_value: Decimal,
}

impl From<CampaignStats> for CampaignStatsResponse {
    fn from(s: CampaignStats) -> Self {
        Self {
            campaign_id: s.campaign_id,
            clicks: s.clicks,
            conversions: s.conversions,
            revenue: round_to_currency(s.revenue, &s.currency),
            commission: round_to_currency(s.commission, &s.currency),
            conversion_rate: s.conversion_rate,
            average_order_value: round_to_currency(s.average_order_value, &s.currency),
            currency: s.currency,
        }
    }
}
