//! Handlers for affiliate link management.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkResponse, UpdateLinkRequest};
use crate::api::dto::pagination::{Paginated, PaginationParams};
use crate::application::services::CreateLink;
use crate::domain::entities::{Actor, Role};
use crate::error::AppError;
use crate::state::AppState;

/// Creates (or returns) an affiliate's tracking link for a campaign.
///
/// # Endpoint
///
/// `POST /api/links` (affiliate, admin)
///
/// # Response
///
/// - `201 Created` for a new link
/// - `200 OK` when the affiliate's generated link for this campaign already
///   existed and is returned unchanged
///
/// # Errors
///
/// Returns 409 Conflict if the custom alias is taken or the campaign has ended.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    actor.require_any(&[Role::Affiliate])?;
    payload.validate()?;

    let affiliate_id = payload.affiliate_id.unwrap_or(actor.id);
    actor.require_self_or_admin(affiliate_id)?;

    let creation = state
        .link_service
        .create_link(CreateLink {
            campaign_id: payload.campaign_id,
            affiliate_id,
            destination_url: payload.destination_url,
            custom_alias: payload.custom_alias,
            expires_at: payload.expires_at,
        })
        .await?;

    let status = if creation.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(creation.link.into())))
}

/// `GET /api/links/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<LinkResponse>, AppError> {
    let resolved = state.link_service.get_link(id).await?;
    actor.require_self_or_admin(resolved.link.affiliate_id)?;

    Ok(Json(resolved.into()))
}

/// Activates or deactivates a link. Inactive links answer 404 on the
/// tracking endpoints.
///
/// `PATCH /api/links/{id}`
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let resolved = state.link_service.get_link(id).await?;
    actor.require_self_or_admin(resolved.link.affiliate_id)?;

    let link = state.link_service.set_active(id, payload.is_active).await?;
    tracing::info!(link_id = id, is_active = payload.is_active, actor_id = actor.id, "Link updated");

    Ok(Json(link.into()))
}

/// `GET /api/affiliates/{affiliate_id}/links?page=&page_size=`
pub async fn list_affiliate_links_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(affiliate_id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<LinkResponse>>, AppError> {
    actor.require_self_or_admin(affiliate_id)?;
    let (page, page_size) = pagination.resolve()?;

    let (links, total) = state
        .link_service
        .list_for_affiliate(affiliate_id, page, page_size)
        .await?;

    Ok(Json(Paginated::new(
        links.into_iter().map(Into::into).collect(),
        page,
        page_size,
        total,
    )))
}
