//! Campaign entity and its commission model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// How a campaign pays its affiliates.
///
/// Stored as a `(commission_type, commission_value)` column pair; the enum makes
/// a percentage without a rate or a fixed payout without an amount unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionModel {
    Percentage { rate: Decimal },
    Fixed { amount: Decimal },
}

impl CommissionModel {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Percentage { .. } => "PERCENTAGE",
            Self::Fixed { .. } => "FIXED",
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            Self::Percentage { rate } => *rate,
            Self::Fixed { amount } => *amount,
        }
    }

    /// Rebuilds the model from its stored column pair.
    pub fn from_parts(kind: &str, value: Decimal) -> Result<Self, AppError> {
        match kind {
            "PERCENTAGE" => Ok(Self::Percentage { rate: value }),
            "FIXED" => Ok(Self::Fixed { amount: value }),
            other => Err(AppError::internal(
                "Unknown commission type",
                json!({ "commission_type": other }),
            )),
        }
    }

    /// Percentage rates must lie in (0, 100]; fixed payouts must be positive.
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            Self::Percentage { rate } if *rate <= Decimal::ZERO || *rate > Decimal::ONE_HUNDRED => {
                Err(AppError::bad_request(
                    "Commission rate must be greater than 0 and at most 100",
                    json!({ "rate": rate }),
                ))
            }
            Self::Fixed { amount } if *amount <= Decimal::ZERO => Err(AppError::bad_request(
                "Fixed commission must be greater than 0",
                json!({ "amount": amount }),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Ended,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::Ended => "ENDED",
        }
    }

    /// `ENDED` is terminal; everything else may end, and `ACTIVE`/`PAUSED` toggle.
    pub fn can_transition_to(&self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Draft, Active) | (Draft, Ended) | (Active, Paused) | (Active, Ended) | (Paused, Active)
                | (Paused, Ended)
        )
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "ACTIVE" => Ok(Self::Active),
            "PAUSED" => Ok(Self::Paused),
            "ENDED" => Ok(Self::Ended),
            other => Err(AppError::internal(
                "Unknown campaign status",
                json!({ "status": other }),
            )),
        }
    }
}

/// Aggregate counters maintained by the tracking core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignCounters {
    pub clicks: i64,
    pub conversions: i64,
    pub revenue: Decimal,
    pub commission: Decimal,
}

#[derive(Debug, Clone)]
pub struct Campaign {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub landing_url: String,
    pub commission: CommissionModel,
    pub currency: String,
    pub status: CampaignStatus,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub counters: CampaignCounters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn snapshot(&self) -> CampaignSnapshot {
        CampaignSnapshot {
            id: self.id,
            status: self.status,
            commission: self.commission,
            currency: self.currency.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        }
    }
}

/// The slice of a campaign the tracking path needs, captured at resolve time.
///
/// Commission is computed from this snapshot so later campaign edits never
/// touch conversions that were already created.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSnapshot {
    pub id: i64,
    pub status: CampaignStatus,
    pub commission: CommissionModel,
    pub currency: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl CampaignSnapshot {
    /// True when the campaign is `ACTIVE` and `now` lies within `[starts_at, ends_at)`.
    pub fn is_running_at(&self, now: DateTime<Utc>) -> bool {
        self.status == CampaignStatus::Active
            && self.starts_at.is_none_or(|start| now >= start)
            && self.ends_at.is_none_or(|end| now < end)
    }
}

/// Input data for creating a campaign. New campaigns start as `DRAFT`.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub creator_id: i64,
    pub name: String,
    pub landing_url: String,
    pub commission: CommissionModel,
    pub currency: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}
