//! Entity builders shared by the service unit tests.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::entities::{
    AffiliateLink, Campaign, CampaignCounters, CampaignStatus, CommissionModel, Conversion,
    ConversionStatus, PaymentRequest, PaymentStatus, ResolvedLink,
};

pub fn campaign(id: i64, status: CampaignStatus) -> Campaign {
    Campaign {
        id,
        creator_id: 1,
        name: "Spring sale".to_string(),
        landing_url: "https://shop.example.com/spring".to_string(),
        commission: CommissionModel::Percentage {
            rate: Decimal::new(10, 0),
        },
        currency: "USD".to_string(),
        status,
        starts_at: None,
        ends_at: None,
        counters: CampaignCounters::default(),
        created_at: Utc::now() - Duration::days(10),
        updated_at: Utc::now() - Duration::days(10),
    }
}

pub fn link(id: i64, campaign_id: i64, affiliate_id: i64, code: &str) -> AffiliateLink {
    AffiliateLink {
        id,
        campaign_id,
        affiliate_id,
        tracking_code: code.to_string(),
        is_custom: false,
        destination_url: "https://shop.example.com/spring".to_string(),
        is_active: true,
        expires_at: None,
        clicks: 0,
        conversions: 0,
        earnings: Decimal::ZERO,
        created_at: Utc::now() - Duration::days(5),
    }
}

pub fn resolved(code: &str, status: CampaignStatus) -> ResolvedLink {
    let campaign = campaign(3, status);
    ResolvedLink {
        link: link(7, campaign.id, 42, code),
        campaign: campaign.snapshot(),
    }
}

pub fn conversion(id: i64, status: ConversionStatus) -> Conversion {
    Conversion {
        id,
        link_id: 7,
        campaign_id: 3,
        affiliate_id: 42,
        click_id: None,
        order_id: format!("order-{id}"),
        sale_amount: Decimal::new(25_000, 2),
        commission: Decimal::new(2_500, 2),
        currency: "USD".to_string(),
        conversion_type: "SALE".to_string(),
        customer_email: None,
        status,
        rejection_reason: None,
        reviewed_by: None,
        converted_at: Utc::now(),
        approved_at: None,
        rejected_at: None,
        paid_at: None,
        payment_request_id: None,
    }
}

pub fn payment_request(id: i64, status: PaymentStatus) -> PaymentRequest {
    PaymentRequest {
        id,
        affiliate_id: 42,
        amount: Decimal::new(6_000, 2),
        currency: "USD".to_string(),
        period_start: Utc::now() - Duration::days(30),
        period_end: Utc::now(),
        status,
        transaction_id: None,
        failure_reason: None,
        processed_by: None,
        requested_at: Utc::now(),
        processed_at: None,
        completed_at: None,
    }
}
