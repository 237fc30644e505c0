//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{
    AttributionService, AuthService, CampaignService, ClickService, ConversionService,
    LinkService, PayoutService,
};
use crate::config::Config;
use crate::domain::click_event::ClickEvent;
use crate::infrastructure::persistence::{
    PgCampaignRepository, PgClickRepository, PgConversionRepository, PgLinkRepository,
    PgPayoutRepository, PgTokenRepository,
};
use crate::utils::attribution_token::AttributionSigner;

pub type PgLinkService = LinkService<PgLinkRepository, PgCampaignRepository>;
pub type PgClickService = ClickService<PgLinkRepository, PgClickRepository>;
pub type PgAttributionService = AttributionService<PgLinkRepository, PgConversionRepository>;

/// Secrets and tracking options the services and handlers need.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub token_signing_secret: String,
    pub attribution_secret: String,
    pub attribution_window_days: i64,
    pub attribution_cookie: String,
    pub behind_proxy: bool,
}

impl From<&Config> for StateSettings {
    fn from(config: &Config) -> Self {
        Self {
            token_signing_secret: config.token_signing_secret.clone(),
            attribution_secret: config.attribution_secret.clone(),
            attribution_window_days: config.attribution_window_days,
            attribution_cookie: config.attribution_cookie.clone(),
            behind_proxy: config.behind_proxy,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub link_service: Arc<PgLinkService>,
    pub click_service: Arc<PgClickService>,
    pub attribution_service: Arc<PgAttributionService>,
    pub conversion_service: Arc<ConversionService<PgConversionRepository>>,
    pub payout_service: Arc<PayoutService<PgPayoutRepository>>,
    pub campaign_service: Arc<CampaignService<PgCampaignRepository>>,
    pub auth_service: Arc<AuthService<PgTokenRepository>>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub attribution_cookie: String,
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the PostgreSQL repositories into the services.
    pub fn new(
        pool: Arc<PgPool>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: StateSettings,
    ) -> Self {
        let campaigns = Arc::new(PgCampaignRepository::new(pool.clone()));
        let links = Arc::new(PgLinkRepository::new(pool.clone()));
        let clicks = Arc::new(PgClickRepository::new(pool.clone()));
        let conversions = Arc::new(PgConversionRepository::new(pool.clone()));
        let payouts = Arc::new(PgPayoutRepository::new(pool.clone()));
        let tokens = Arc::new(PgTokenRepository::new(pool.clone()));

        let signer = AttributionSigner::new(
            settings.attribution_secret.into_bytes(),
            settings.attribution_window_days,
        );

        Self {
            db: pool,
            link_service: Arc::new(LinkService::new(links.clone(), campaigns.clone())),
            click_service: Arc::new(ClickService::new(links.clone(), clicks, signer.clone())),
            attribution_service: Arc::new(AttributionService::new(
                links,
                conversions.clone(),
                signer,
            )),
            conversion_service: Arc::new(ConversionService::new(conversions)),
            payout_service: Arc::new(PayoutService::new(payouts)),
            campaign_service: Arc::new(CampaignService::new(campaigns)),
            auth_service: Arc::new(AuthService::new(tokens, settings.token_signing_secret)),
            click_sender,
            attribution_cookie: settings.attribution_cookie,
            behind_proxy: settings.behind_proxy,
        }
    }
}
