//! Repository trait definitions for the domain layer.
//!
//! These traits are the store ports of the tracking core. Services are generic
//! over them and the PostgreSQL implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated by
//! `mockall` for unit tests.
//!
//! - [`CampaignRepository`] - campaign administration and activity sums
//! - [`LinkRepository`] - tracking links and their lookup
//! - [`ClickRepository`] - click log and click counters
//! - [`ConversionRepository`] - idempotent attribution and review lifecycle
//! - [`PayoutRepository`] - earnings ledger and payment requests
//! - [`TokenRepository`] - API token authentication

pub mod campaign_repository;
pub mod click_repository;
pub mod conversion_repository;
pub mod link_repository;
pub mod payout_repository;
pub mod token_repository;

pub use campaign_repository::{CampaignActivity, CampaignRepository};
pub use click_repository::ClickRepository;
pub use conversion_repository::{ConversionFilter, ConversionRepository};
pub use link_repository::LinkRepository;
pub use payout_repository::PayoutRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use campaign_repository::MockCampaignRepository;
#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use conversion_repository::MockConversionRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use payout_repository::MockPayoutRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
