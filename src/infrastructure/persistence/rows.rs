//! Row types filled by the `query_as!` macros and their mapping onto entities.
//!
//! Status and commission columns are stored as text and parsed here, so a
//! value the domain does not know surfaces as [`AppError::Internal`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::entities::{
    AffiliateLink, Campaign, CampaignCounters, CampaignSnapshot, Click, CommissionModel,
    Conversion, PaymentRequest, ResolvedLink, Role,
};
use crate::domain::repositories::ApiToken;
use crate::error::AppError;

pub(crate) struct CampaignRow {
    pub(crate) id: i64,
    pub(crate) creator_id: i64,
    pub(crate) name: String,
    pub(crate) landing_url: String,
    pub(crate) commission_type: String,
    pub(crate) commission_value: Decimal,
    pub(crate) currency: String,
    pub(crate) status: String,
    pub(crate) starts_at: Option<DateTime<Utc>>,
    pub(crate) ends_at: Option<DateTime<Utc>>,
    pub(crate) total_clicks: i64,
    pub(crate) total_conversions: i64,
    pub(crate) total_revenue: Decimal,
    pub(crate) total_commission: Decimal,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = AppError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Campaign {
            id: row.id,
            creator_id: row.creator_id,
            name: row.name,
            landing_url: row.landing_url,
            commission: CommissionModel::from_parts(&row.commission_type, row.commission_value)?,
            currency: row.currency,
            status: row.status.parse()?,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            counters: CampaignCounters {
                clicks: row.total_clicks,
                conversions: row.total_conversions,
                revenue: row.total_revenue,
                commission: row.total_commission,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) struct LinkRow {
    pub(crate) id: i64,
    pub(crate) campaign_id: i64,
    pub(crate) affiliate_id: i64,
    pub(crate) tracking_code: String,
    pub(crate) is_custom: bool,
    pub(crate) destination_url: String,
    pub(crate) is_active: bool,
    pub(crate) expires_at: Option<DateTime<Utc>>,
    pub(crate) clicks: i64,
    pub(crate) conversions: i64,
    pub(crate) earnings: Decimal,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<LinkRow> for AffiliateLink {
    fn from(row: LinkRow) -> Self {
        AffiliateLink {
            id: row.id,
            campaign_id: row.campaign_id,
            affiliate_id: row.affiliate_id,
            tracking_code: row.tracking_code,
            is_custom: row.is_custom,
            destination_url: row.destination_url,
            is_active: row.is_active,
            expires_at: row.expires_at,
            clicks: row.clicks,
            conversions: row.conversions,
            earnings: row.earnings,
            created_at: row.created_at,
        }
    }
}

pub(crate) struct ResolvedLinkRow {
    pub(crate) id: i64,
    pub(crate) campaign_id: i64,
    pub(crate) affiliate_id: i64,
    pub(crate) tracking_code: String,
    pub(crate) is_custom: bool,
    pub(crate) destination_url: String,
    pub(crate) is_active: bool,
    pub(crate) expires_at: Option<DateTime<Utc>>,
    pub(crate) clicks: i64,
    pub(crate) conversions: i64,
    pub(crate) earnings: Decimal,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) campaign_status: String,
    pub(crate) commission_type: String,
    pub(crate) commission_value: Decimal,
    pub(crate) campaign_currency: String,
    pub(crate) campaign_starts_at: Option<DateTime<Utc>>,
    pub(crate) campaign_ends_at: Option<DateTime<Utc>>,
}

impl TryFrom<ResolvedLinkRow> for ResolvedLink {
    type Error = AppError;

    fn try_from(row: ResolvedLinkRow) -> Result<Self, Self::Error> {
        let campaign = CampaignSnapshot {
            id: row.campaign_id,
            status: row.campaign_status.parse()?,
            commission: CommissionModel::from_parts(&row.commission_type, row.commission_value)?,
            currency: row.campaign_currency,
            starts_at: row.campaign_starts_at,
            ends_at: row.campaign_ends_at,
        };

        Ok(ResolvedLink {
            link: AffiliateLink {
                id: row.id,
                campaign_id: row.campaign_id,
                affiliate_id: row.affiliate_id,
                tracking_code: row.tracking_code,
                is_custom: row.is_custom,
                destination_url: row.destination_url,
                is_active: row.is_active,
                expires_at: row.expires_at,
                clicks: row.clicks,
                conversions: row.conversions,
                earnings: row.earnings,
                created_at: row.created_at,
            },
            campaign,
        })
    }
}

pub(crate) struct ClickRow {
    pub(crate) id: i64,
    pub(crate) link_id: i64,
    pub(crate) clicked_at: DateTime<Utc>,
    pub(crate) ip: Option<String>,
    pub(crate) user_agent: Option<String>,
    pub(crate) referer: Option<String>,
    pub(crate) device: String,
    pub(crate) browser: String,
    pub(crate) country: Option<String>,
    pub(crate) visitor_id: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(row: ClickRow) -> Self {
        Click {
            id: row.id,
            link_id: row.link_id,
            clicked_at: row.clicked_at,
            ip: row.ip,
            user_agent: row.user_agent,
            referer: row.referer,
            device: row.device,
            browser: row.browser,
            country: row.country,
            visitor_id: row.visitor_id,
        }
    }
}

pub(crate) struct ConversionRow {
    pub(crate) id: i64,
    pub(crate) link_id: i64,
    pub(crate) campaign_id: i64,
    pub(crate) affiliate_id: i64,
    pub(crate) click_id: Option<i64>,
    pub(crate) order_id: String,
    pub(crate) sale_amount: Decimal,
    pub(crate) commission: Decimal,
    pub(crate) currency: String,
    pub(crate) conversion_type: String,
    pub(crate) customer_email: Option<String>,
    pub(crate) status: String,
    pub(crate) rejection_reason: Option<String>,
    pub(crate) reviewed_by: Option<i64>,
    pub(crate) converted_at: DateTime<Utc>,
    pub(crate) approved_at: Option<DateTime<Utc>>,
    pub(crate) rejected_at: Option<DateTime<Utc>>,
    pub(crate) paid_at: Option<DateTime<Utc>>,
    pub(crate) payment_request_id: Option<i64>,
}

impl TryFrom<ConversionRow> for Conversion {
    type Error = AppError;

    fn try_from(row: ConversionRow) -> Result<Self, Self::Error> {
        Ok(Conversion {
            id: row.id,
            link_id: row.link_id,
            campaign_id: row.campaign_id,
            affiliate_id: row.affiliate_id,
            click_id: row.click_id,
            order_id: row.order_id,
            sale_amount: row.sale_amount,
            commission: row.commission,
            currency: row.currency,
            conversion_type: row.conversion_type,
            customer_email: row.customer_email,
            status: row.status.parse()?,
            rejection_reason: row.rejection_reason,
            reviewed_by: row.reviewed_by,
            converted_at: row.converted_at,
            approved_at: row.approved_at,
            rejected_at: row.rejected_at,
            paid_at: row.paid_at,
            payment_request_id: row.payment_request_id,
        })
    }
}

pub(crate) struct PaymentRequestRow {
    pub(crate) id: i64,
    pub(crate) affiliate_id: i64,
    pub(crate) amount: Decimal,
    pub(crate) currency: String,
    pub(crate) period_start: DateTime<Utc>,
    pub(crate) period_end: DateTime<Utc>,
    pub(crate) status: String,
    pub(crate) transaction_id: Option<String>,
    pub(crate) failure_reason: Option<String>,
    pub(crate) processed_by: Option<i64>,
    pub(crate) requested_at: DateTime<Utc>,
    pub(crate) processed_at: Option<DateTime<Utc>>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRequestRow> for PaymentRequest {
    type Error = AppError;

    fn try_from(row: PaymentRequestRow) -> Result<Self, Self::Error> {
        Ok(PaymentRequest {
            id: row.id,
            affiliate_id: row.affiliate_id,
            amount: row.amount,
            currency: row.currency,
            period_start: row.period_start,
            period_end: row.period_end,
            status: row.status.parse()?,
            transaction_id: row.transaction_id,
            failure_reason: row.failure_reason,
            processed_by: row.processed_by,
            requested_at: row.requested_at,
            processed_at: row.processed_at,
            completed_at: row.completed_at,
        })
    }
}

pub(crate) struct TokenRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) token_hash: String,
    pub(crate) actor_id: i64,
    pub(crate) role: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_used_at: Option<DateTime<Utc>>,
    pub(crate) revoked_at: Option<DateTime<Utc>>,
}

impl TryFrom<TokenRow> for ApiToken {
    type Error = AppError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|_| {
            AppError::internal("Unknown role stored for token", serde_json::json!({ "token_id": row.id }))
        })?;

        Ok(ApiToken {
            id: row.id,
            name: row.name,
            token_hash: row.token_hash,
            actor_id: row.actor_id,
            role,
            created_at: row.created_at,
            last_used_at: row.last_used_at,
            revoked_at: row.revoked_at,
        })
    }
}

/// Maps a list of rows, failing on the first unmappable one.
pub(crate) fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}
