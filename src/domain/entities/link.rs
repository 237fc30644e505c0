//! Affiliate link entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::campaign::CampaignSnapshot;

/// A tracking link owned by one affiliate inside one campaign.
///
/// The tracking code is fixed at creation. Counters only move through the
/// click recorder and the conversion lifecycle.
#[derive(Debug, Clone)]
pub struct AffiliateLink {
    pub id: i64,
    pub campaign_id: i64,
    pub affiliate_id: i64,
    pub tracking_code: String,
    pub is_custom: bool,
    pub destination_url: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub conversions: i64,
    pub earnings: Decimal,
    pub created_at: DateTime<Utc>,
}

impl AffiliateLink {
    /// Returns true if the link has an expiry that is not in the future.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewAffiliateLink {
    pub campaign_id: i64,
    pub affiliate_id: i64,
    pub tracking_code: String,
    pub is_custom: bool,
    pub destination_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A link joined with the campaign state needed to serve it.
#[derive(Debug, Clone)]
pub struct ResolvedLink {
    pub link: AffiliateLink,
    pub campaign: CampaignSnapshot,
}
