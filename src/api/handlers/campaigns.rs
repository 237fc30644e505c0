//! Handlers for campaign administration and stats.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::campaigns::{
    CampaignResponse, CampaignStatsResponse, CreateCampaignRequest, UpdateCampaignStatusRequest,
};
use crate::api::dto::pagination::DateFilterParams;
use crate::domain::entities::{Actor, Role};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a campaign in `DRAFT`.
///
/// # Endpoint
///
/// `POST /api/campaigns` (admin)
pub async fn create_campaign_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), AppError> {
    actor.require_admin()?;
    payload.validate()?;

    let campaign = state
        .campaign_service
        .create(actor.id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(campaign.into())))
}

/// `GET /api/campaigns/{id}`
pub async fn get_campaign_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CampaignResponse>, AppError> {
    let campaign = state.campaign_service.get(id).await?;
    Ok(Json(campaign.into()))
}

/// Moves a campaign along its status graph (`DRAFT`, `ACTIVE`, `PAUSED`, `ENDED`).
///
/// # Endpoint
///
/// `PATCH /api/campaigns/{id}/status` (admin)
///
/// # Errors
///
/// Returns 409 Conflict for a transition the status graph does not allow.
pub async fn update_campaign_status_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCampaignStatusRequest>,
) -> Result<Json<CampaignResponse>, AppError> {
    actor.require_admin()?;

    let campaign = state.campaign_service.set_status(id, payload.status).await?;
    Ok(Json(campaign.into()))
}

/// Campaign totals with conversion rate and average order value.
///
/// # Endpoint
///
/// `GET /api/campaigns/{id}/stats?from=&to=` (admin, merchant)
///
/// Without a range the running counters are reported; with one, the click
/// log and non-rejected conversions inside `[from, to)`.
pub async fn campaign_stats_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Query(range): Query<DateFilterParams>,
) -> Result<Json<CampaignStatsResponse>, AppError> {
    actor.require_any(&[Role::Merchant])?;

    let stats = state
        .campaign_service
        .stats(id, range.both_or_none()?)
        .await?;

    Ok(Json(stats.into()))
}
