//! PostgreSQL repository implementations.
//!
//! Queries are checked against the schema at compile time with the `sqlx`
//! macros; full rows decode into the types in [`rows`].
//!
//! # Repositories
//!
//! - [`PgCampaignRepository`] - Campaigns and period activity
//! - [`PgLinkRepository`] - Affiliate links and tracking-code lookups
//! - [`PgClickRepository`] - Click log and link/campaign click counters
//! - [`PgConversionRepository`] - Idempotent attribution and review
//! - [`PgPayoutRepository`] - Earnings ledger and payment requests
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_campaign_repository;
pub mod pg_click_repository;
pub mod pg_conversion_repository;
pub mod pg_link_repository;
pub mod pg_payout_repository;
pub mod pg_token_repository;
mod rows;

pub use pg_campaign_repository::PgCampaignRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_conversion_repository::PgConversionRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_payout_repository::PgPayoutRepository;
pub use pg_token_repository::PgTokenRepository;
