//! Click recording for resolved tracking links.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::entities::{NewClick, RequestMetadata};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::domain::user_agent;
use crate::error::AppError;
use crate::utils::attribution_token::AttributionSigner;

use super::link_resolver::LinkResolver;

/// What the HTTP layer needs to answer a click.
#[derive(Debug, Clone)]
pub struct ClickReceipt {
    pub click_id: i64,
    pub link_id: i64,
    pub redirect_url: String,
    pub attribution_token: String,
    pub token_expires_at: DateTime<Utc>,
}

/// Records clicks and issues attribution tokens.
///
/// A click is only stored after the link passes every resolver check, so
/// rejected clicks leave neither a row nor a counter change behind.
pub struct ClickService<L: LinkRepository, K: ClickRepository> {
    resolver: LinkResolver<L>,
    click_repository: Arc<K>,
    signer: AttributionSigner,
}

impl<L: LinkRepository, K: ClickRepository> ClickService<L, K> {
    pub fn new(link_repository: Arc<L>, click_repository: Arc<K>, signer: AttributionSigner) -> Self {
        Self {
            resolver: LinkResolver::new(link_repository),
            click_repository,
            signer,
        }
    }

    /// Resolves `code`, stores a click and signs an attribution token for it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkUnavailable`] if the link cannot be served.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn record_click(
        &self,
        code: &str,
        metadata: RequestMetadata,
    ) -> Result<ClickReceipt, AppError> {
        let now = Utc::now();
        let resolved = self.resolver.resolve_at(code, now).await?;
        let (device, browser) = user_agent::classify(metadata.user_agent.as_deref());

        let click = self
            .click_repository
            .record(NewClick {
                link_id: resolved.link.id,
                campaign_id: resolved.campaign.id,
                ip: metadata.ip,
                user_agent: metadata.user_agent,
                referer: metadata.referer,
                device,
                browser,
                country: metadata.country,
                visitor_id: metadata.visitor_id,
            })
            .await?;

        metrics::counter!("clicks_recorded_total").increment(1);

        let (attribution_token, token_expires_at) =
            self.signer.issue(resolved.link.id, click.id, now)?;

        tracing::debug!(
            click_id = click.id,
            link_id = resolved.link.id,
            device = %device,
            browser = %browser,
            "Click recorded"
        );

        Ok(ClickReceipt {
            click_id: click.id,
            link_id: resolved.link.id,
            redirect_url: resolved.link.destination_url,
            attribution_token,
            token_expires_at,
        })
    }

    pub fn attribution_window(&self) -> chrono::Duration {
        self.signer.window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::resolved;
    use crate::domain::entities::{CampaignStatus, Click};
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use crate::error::LinkUnavailable;
    use chrono::Duration;

    fn signer() -> AttributionSigner {
        AttributionSigner::new("click-test-secret", 30)
    }

    fn stored(new: &NewClick, id: i64) -> Click {
        Click {
            id,
            link_id: new.link_id,
            clicked_at: Utc::now(),
            ip: new.ip.clone(),
            user_agent: new.user_agent.clone(),
            referer: new.referer.clone(),
            device: new.device.to_string(),
            browser: new.browser.to_string(),
            country: new.country.clone(),
            visitor_id: new.visitor_id.clone(),
        }
    }

    #[tokio::test]
    async fn test_record_click_success() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(resolved(code, CampaignStatus::Active))));

        let mut clicks = MockClickRepository::new();
        clicks
            .expect_record()
            .withf(|new| {
                new.link_id == 7
                    && new.campaign_id == 3
                    && new.device.as_str() == "mobile"
                    && new.browser.as_str() == "safari"
            })
            .times(1)
            .returning(|new| Ok(stored(&new, 555)));

        let service = ClickService::new(Arc::new(links), Arc::new(clicks), signer());

        let metadata = RequestMetadata {
            ip: Some("203.0.113.9".to_string()),
            user_agent: Some(
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1"
                    .to_string(),
            ),
            ..Default::default()
        };

        let receipt = service.record_click("k3j9x0a1", metadata).await.unwrap();
        assert_eq!(receipt.click_id, 555);
        assert_eq!(receipt.redirect_url, "https://shop.example.com/spring");

        let claims = signer()
            .verify(&receipt.attribution_token, Utc::now())
            .unwrap();
        assert_eq!(claims.link_id, 7);
        assert_eq!(claims.click_id, 555);
    }

    #[tokio::test]
    async fn test_expired_link_records_nothing() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            let mut found = resolved(code, CampaignStatus::Active);
            found.link.expires_at = Some(Utc::now() - Duration::days(1));
            Ok(Some(found))
        });

        let mut clicks = MockClickRepository::new();
        clicks.expect_record().never();

        let service = ClickService::new(Arc::new(links), Arc::new(clicks), signer());

        let err = service
            .record_click("k3j9x0a1", RequestMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::LinkUnavailable(LinkUnavailable::LinkExpired)
        ));
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .returning(|code| Ok(Some(resolved(code, CampaignStatus::Active))));

        let mut clicks = MockClickRepository::new();
        clicks
            .expect_record()
            .returning(|_| Err(AppError::internal("Database error", serde_json::json!({}))));

        let service = ClickService::new(Arc::new(links), Arc::new(clicks), signer());

        let err = service
            .record_click("k3j9x0a1", RequestMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
