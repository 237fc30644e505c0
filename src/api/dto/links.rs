//! DTOs for affiliate link management.

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::{AffiliateLink, ResolvedLink};

static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").unwrap());

/// `POST /api/links`
///
/// `affiliate_id` is taken from the caller unless an administrator creates
/// the link on someone's behalf.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    pub campaign_id: i64,

    pub affiliate_id: Option<i64>,

    #[validate(url(message = "Invalid URL format"))]
    pub destination_url: Option<String>,

    #[validate(length(min = 8, max = 15))]
    #[validate(regex(path = "*ALIAS_REGEX"))]
    pub custom_alias: Option<String>,

    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLinkRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub campaign_id: i64,
    pub affiliate_id: i64,
    pub tracking_code: String,
    /// Path of the click endpoint for this link, relative to the service root.
    pub tracking_path: String,
    pub destination_url: String,
    pub is_custom: bool,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub conversions: i64,
    pub earnings: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<AffiliateLink> for LinkResponse {
    fn from(link: AffiliateLink) -> Self {
        Self {
            tracking_path: format!("/track/click/{}", link.tracking_code),
            id: link.id,
            campaign_id: link.campaign_id,
            affiliate_id: link.affiliate_id,
            tracking_code: link.tracking_code,
            destination_url: link.destination_url,
            is_custom: link.is_custom,
            is_active: link.is_active,
            expires_at: link.expires_at,
            clicks: link.clicks,
            conversions: link.conversions,
            // Stored at four places; the link does not carry its currency.
            earnings: link.earnings.normalize(),
            created_at: link.created_at,
        }
    }
}

impl From<ResolvedLink> for LinkResponse {
    fn from(resolved: ResolvedLink) -> Self {
        resolved.link.into()
    }
}
