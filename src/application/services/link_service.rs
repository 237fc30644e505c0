//! Tracking code registry: link creation and lookup.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{AffiliateLink, CampaignStatus, NewAffiliateLink, ResolvedLink};
use crate::domain::repositories::{CampaignRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::url_normalizer::normalize_url;

/// Bound on regenerations before giving up with `CodeGenerationExhausted`.
pub const MAX_CODE_ATTEMPTS: usize = 10;

const TRACKING_CODE_KEY: &str = "affiliate_links_tracking_code_key";
const GENERATED_LINK_KEY: &str = "affiliate_links_generated_key";

/// Request to create a link for an affiliate.
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub campaign_id: i64,
    pub affiliate_id: i64,
    /// Falls back to the campaign landing URL.
    pub destination_url: Option<String>,
    pub custom_alias: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Outcome of [`LinkService::create_link`].
#[derive(Debug, Clone)]
pub struct LinkCreation {
    pub link: AffiliateLink,
    /// False when an existing generated link was returned.
    pub created: bool,
}

/// Mints and looks up affiliate links.
///
/// Without an alias, link creation is idempotent per campaign and affiliate:
/// the existing generated link is returned instead of a second one.
pub struct LinkService<L: LinkRepository, C: CampaignRepository> {
    link_repository: Arc<L>,
    campaign_repository: Arc<C>,
}

impl<L: LinkRepository, C: CampaignRepository> LinkService<L, C> {
    pub fn new(link_repository: Arc<L>, campaign_repository: Arc<C>) -> Self {
        Self {
            link_repository,
            campaign_repository,
        }
    }

    /// Creates (or returns) a tracking link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the campaign does not exist.
    /// Returns [`AppError::InvalidState`] if the campaign has ended.
    /// Returns [`AppError::Validation`] if the alias, destination or expiry is invalid.
    /// Returns [`AppError::Conflict`] if the alias is already taken.
    /// Returns [`AppError::CodeGenerationExhausted`] if no free code was found.
    pub async fn create_link(&self, request: CreateLink) -> Result<LinkCreation, AppError> {
        let campaign = self
            .campaign_repository
            .find_by_id(request.campaign_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Campaign not found",
                    json!({ "campaign_id": request.campaign_id }),
                )
            })?;

        if campaign.status == CampaignStatus::Ended {
            return Err(AppError::invalid_state(
                "Cannot create links for an ended campaign",
                json!({ "campaign_id": campaign.id, "status": campaign.status }),
            ));
        }

        if let Some(expires_at) = request.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::bad_request(
                "Link expiry must be in the future",
                json!({ "expires_at": expires_at }),
            ));
        }

        let destination_url = normalize_url(
            request
                .destination_url
                .as_deref()
                .unwrap_or(&campaign.landing_url),
        )?;

        let (tracking_code, is_custom) = match request.custom_alias {
            Some(alias) => {
                validate_custom_code(&alias)?;

                if self.link_repository.code_exists(&alias).await? {
                    return Err(AppError::conflict(
                        "Tracking code already exists",
                        json!({ "code": alias }),
                    ));
                }

                (alias, true)
            }
            None => {
                if let Some(existing) = self
                    .link_repository
                    .find_generated(campaign.id, request.affiliate_id)
                    .await?
                {
                    return Ok(LinkCreation {
                        link: existing,
                        created: false,
                    });
                }

                (self.generate_unique_code().await?, false)
            }
        };

        let mut new_link = NewAffiliateLink {
            campaign_id: campaign.id,
            affiliate_id: request.affiliate_id,
            tracking_code,
            is_custom,
            destination_url,
            expires_at: request.expires_at,
        };
        let mut attempts = 1;

        loop {
            match self.link_repository.create(new_link.clone()).await {
                Ok(link) => {
                    tracing::info!(
                        link_id = link.id,
                        campaign_id = link.campaign_id,
                        affiliate_id = link.affiliate_id,
                        code = %link.tracking_code,
                        "Affiliate link created"
                    );
                    return Ok(LinkCreation {
                        link,
                        created: true,
                    });
                }
                // The generated code was taken between the check and the insert.
                Err(e) if !is_custom && e.violated_constraint() == Some(TRACKING_CODE_KEY) => {
                    if attempts >= MAX_CODE_ATTEMPTS {
                        tracing::warn!(attempts, "Tracking code space exhausted");
                        return Err(AppError::CodeGenerationExhausted { attempts });
                    }
                    attempts += 1;
                    tracing::debug!(attempt = attempts, "Tracking code taken on insert");
                    new_link.tracking_code = self.generate_unique_code().await?;
                }
                // A concurrent request created the generated link first.
                Err(e) if !is_custom && e.violated_constraint() == Some(GENERATED_LINK_KEY) => {
                    let link = self
                        .link_repository
                        .find_generated(campaign.id, request.affiliate_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal(
                                "Generated link vanished after conflict",
                                json!({ "campaign_id": campaign.id }),
                            )
                        })?;
                    return Ok(LinkCreation {
                        link,
                        created: false,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Retrieves a link with its campaign by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn get_link(&self, id: i64) -> Result<ResolvedLink, AppError> {
        self.link_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": id })))
    }

    /// Lists an affiliate's links with the total count.
    pub async fn list_for_affiliate(
        &self,
        affiliate_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<AffiliateLink>, i64), AppError> {
        let links = self
            .link_repository
            .list_by_affiliate(affiliate_id, page, page_size)
            .await?;
        let total = self.link_repository.count_by_affiliate(affiliate_id).await?;

        Ok((links, total))
    }

    /// Enables or disables a link.
    pub async fn set_active(&self, id: i64, active: bool) -> Result<AffiliateLink, AppError> {
        self.link_repository
            .set_active(id, active)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": id })))
    }

    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code();

            if !self.link_repository.code_exists(&code).await? {
                return Ok(code);
            }

            tracing::debug!(attempt, "Tracking code collision");
        }

        tracing::warn!(attempts = MAX_CODE_ATTEMPTS, "Tracking code space exhausted");
        Err(AppError::CodeGenerationExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }
}
