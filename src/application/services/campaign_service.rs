//! Campaign administration and reporting projection.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Campaign, CampaignStatus, CommissionModel, NewCampaign};
use crate::domain::repositories::{CampaignActivity, CampaignRepository};
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// Input for [`CampaignService::create`].
#[derive(Debug, Clone)]
pub struct CreateCampaign {
    pub name: String,
    pub landing_url: String,
    pub commission: CommissionModel,
    pub currency: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Read model for campaign reporting. Derived ratios are computed here and
/// never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignStats {
    pub campaign_id: i64,
    pub currency: String,
    pub clicks: i64,
    pub conversions: i64,
    pub revenue: Decimal,
    pub commission: Decimal,
    /// Conversions per 100 clicks, 2 dp.
    pub conversion_rate: Decimal,
    /// Revenue per conversion, 2 dp.
    pub average_order_value: Decimal,
}

impl CampaignStats {
    pub fn project(campaign_id: i64, currency: String, activity: CampaignActivity) -> Self {
        let conversion_rate = ratio(
            Decimal::from(activity.conversions) * Decimal::ONE_HUNDRED,
            activity.clicks,
        );
        let average_order_value = ratio(activity.revenue, activity.conversions);

        Self {
            campaign_id,
            currency,
            clicks: activity.clicks,
            conversions: activity.conversions,
            revenue: activity.revenue,
            commission: activity.commission,
            conversion_rate,
            average_order_value,
        }
    }
}

fn ratio(numerator: Decimal, denominator: i64) -> Decimal {
    let mut value = if denominator == 0 {
        Decimal::ZERO
    } else {
        (numerator / Decimal::from(denominator))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };
    value.rescale(2);
    value
}

pub struct CampaignService<C: CampaignRepository> {
    repository: Arc<C>,
}

impl<C: CampaignRepository> CampaignService<C> {
    pub fn new(repository: Arc<C>) -> Self {
        Self { repository }
    }

    /// Creates a campaign in `DRAFT`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty name, an invalid landing
    /// URL, commission model, currency or validity window.
    pub async fn create(&self, creator_id: i64, input: CreateCampaign) -> Result<Campaign, AppError> {
        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > 200 {
            return Err(AppError::bad_request(
                "Campaign name must be 1-200 characters",
                json!({ "name": input.name }),
            ));
        }

        input.commission.validate()?;

        let currency = input.currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(AppError::bad_request(
                "Currency must be a 3-letter ISO 4217 code",
                json!({ "currency": input.currency }),
            ));
        }

        if let (Some(start), Some(end)) = (input.starts_at, input.ends_at)
            && end <= start
        {
            return Err(AppError::bad_request(
                "Campaign must end after it starts",
                json!({ "starts_at": start, "ends_at": end }),
            ));
        }

        let campaign = self
            .repository
            .create(NewCampaign {
                creator_id,
                name: name.to_string(),
                landing_url: normalize_url(&input.landing_url)?,
                commission: input.commission,
                currency,
                starts_at: input.starts_at,
                ends_at: input.ends_at,
            })
            .await?;

        tracing::info!(campaign_id = campaign.id, creator_id, "Campaign created");
        Ok(campaign)
    }

    pub async fn get(&self, id: i64) -> Result<Campaign, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Campaign not found", json!({ "campaign_id": id })))
    }

    /// Moves a campaign along its status graph.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the campaign does not exist.
    /// Returns [`AppError::InvalidState`] if the transition is not allowed or
    /// the status changed concurrently.
    pub async fn set_status(&self, id: i64, to: CampaignStatus) -> Result<Campaign, AppError> {
        let current = self.get(id).await?;

        if !current.status.can_transition_to(to) {
            return Err(AppError::invalid_state(
                "Campaign status transition not allowed",
                json!({ "campaign_id": id, "status": current.status, "requested": to }),
            ));
        }

        let updated = self
            .repository
            .update_status(id, current.status, to)
            .await?
            .ok_or_else(|| {
                AppError::invalid_state(
                    "Campaign status changed concurrently",
                    json!({ "campaign_id": id, "expected": current.status }),
                )
            })?;

        tracing::info!(campaign_id = id, from = %current.status, to = %to, "Campaign status changed");
        Ok(updated)
    }

    /// Campaign totals with derived ratios.
    ///
    /// Without a range the stored counters are used; with a range the click
    /// log and non-rejected conversions inside `[from, to)` are aggregated.
    pub async fn stats(
        &self,
        id: i64,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<CampaignStats, AppError> {
        let campaign = self.get(id).await?;

        let activity = match range {
            None => CampaignActivity {
                clicks: campaign.counters.clicks,
                conversions: campaign.counters.conversions,
                revenue: campaign.counters.revenue,
                commission: campaign.counters.commission,
            },
            Some((from, to)) if from >= to => {
                return Err(AppError::bad_request(
                    "Range start must be before range end",
                    json!({ "from": from, "to": to }),
                ));
            }
            Some((from, to)) => self.repository.activity_between(id, from, to).await?,
        };

        Ok(CampaignStats::project(campaign.id, campaign.currency, activity))
    }
}
