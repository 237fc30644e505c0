//! Business logic services for the application layer.

pub mod attribution_service;
pub mod auth_service;
pub mod campaign_service;
pub mod click_service;
pub mod conversion_service;
pub mod link_resolver;
pub mod link_service;
pub mod payout_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use attribution_service::{AttributeOrder, AttributionResult, AttributionService};
pub use auth_service::AuthService;
pub use campaign_service::{CampaignService, CampaignStats, CreateCampaign};
pub use click_service::{ClickReceipt, ClickService};
pub use conversion_service::ConversionService;
pub use link_resolver::LinkResolver;
pub use link_service::{CreateLink, LinkCreation, LinkService};
pub use payout_service::{PayoutService, RequestPayout};
