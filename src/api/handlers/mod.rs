//! HTTP request handlers.
//!
//! Each module groups the endpoints of one resource. Handlers behind the API
//! router receive the authenticated [`Actor`](crate::domain::entities::Actor)
//! as an extension and perform their own role checks.

pub mod campaigns;
pub mod conversions;
pub mod health;
pub mod links;
pub mod payouts;
pub mod track;

pub use campaigns::{
    campaign_stats_handler, create_campaign_handler, get_campaign_handler,
    update_campaign_status_handler,
};
pub use conversions::{
    approve_conversion_handler, attribute_conversion_handler, get_conversion_handler,
    list_conversions_handler, reject_conversion_handler,
};
pub use health::health_handler;
pub use links::{
    create_link_handler, get_link_handler, list_affiliate_links_handler, update_link_handler,
};
pub use payouts::{
    create_payment_request_handler, earnings_handler, get_payment_request_handler,
    payment_history_handler, process_payment_request_handler,
};
pub use track::{click_handler, pixel_handler};
