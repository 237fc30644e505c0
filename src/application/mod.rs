//! Application layer services implementing business logic.
//!
//! Services orchestrate repository calls, validation and business rules. They
//! are generic over the repository traits and give HTTP handlers a small API.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - tracking code registry
//! - [`services::link_resolver::LinkResolver`] - code lookup and validity checks
//! - [`services::click_service::ClickService`] - click recording
//! - [`services::attribution_service::AttributionService`] - conversion attribution
//! - [`services::conversion_service::ConversionService`] - conversion review
//! - [`services::payout_service::PayoutService`] - earnings and payment requests
//! - [`services::campaign_service::CampaignService`] - campaign administration and stats
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
