//! Tracking code resolution and validity gating.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::entities::ResolvedLink;
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, LinkUnavailable};

/// Maps a tracking code to its link and campaign and decides whether it may
/// be served.
///
/// Checks run in order and stop at the first failure:
///
/// 1. the link exists ([`LinkUnavailable::LinkNotFound`]) and is active
///    ([`LinkUnavailable::LinkInactive`])
/// 2. the campaign is `ACTIVE` and inside its validity window
///    ([`LinkUnavailable::CampaignNotActive`])
/// 3. the link has no expiry or it lies in the future
///    ([`LinkUnavailable::LinkExpired`])
pub struct LinkResolver<L: LinkRepository> {
    links: Arc<L>,
}

impl<L: LinkRepository> LinkResolver<L> {
    pub fn new(links: Arc<L>) -> Self {
        Self { links }
    }

    pub async fn resolve(&self, code: &str) -> Result<ResolvedLink, AppError> {
        self.resolve_at(code, Utc::now()).await
    }

    pub async fn resolve_at(&self, code: &str, now: DateTime<Utc>) -> Result<ResolvedLink, AppError> {
        let found = self.links.find_by_code(code).await?;
        Ok(gate(found, now)?)
    }

    /// Same checks, starting from a link id carried by an attribution token.
    pub async fn resolve_id_at(
        &self,
        link_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ResolvedLink, AppError> {
        let found = self.links.find_by_id(link_id).await?;
        Ok(gate(found, now)?)
    }
}

fn gate(found: Option<ResolvedLink>, now: DateTime<Utc>) -> Result<ResolvedLink, LinkUnavailable> {
    let resolved = found.ok_or(LinkUnavailable::LinkNotFound)?;

    if !resolved.link.is_active {
        return Err(LinkUnavailable::LinkInactive);
    }
    if !resolved.campaign.is_running_at(now) {
        return Err(LinkUnavailable::CampaignNotActive);
    }
    if resolved.link.is_expired_at(now) {
        return Err(LinkUnavailable::LinkExpired);
    }

    Ok(resolved)
}
