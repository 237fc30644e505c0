//! Handlers for conversion ingestion and review.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::conversions::{
    AttributeConversionRequest, AttributeConversionResponse, ConversionListQuery,
    ConversionResponse, RejectConversionRequest,
};
use crate::api::dto::pagination::Paginated;
use crate::domain::entities::{Actor, Role};
use crate::domain::repositories::ConversionFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Attributes an order to an affiliate link.
///
/// # Endpoint
///
/// `POST /api/conversions` (merchant, admin)
///
/// # Request Body
///
/// ```json
/// {
///   "order_id": "A-1001",
///   "sale_amount": "250.00",
///   "attribution_ref": "<tracking code or attribution cookie value>",
///   "currency": "USD"
/// }
/// ```
///
/// # Response
///
/// `201 Created` for a new conversion. A repeated order id for the same
/// campaign answers `200 OK` with `"duplicate": true` and the original
/// conversion; nothing is credited twice.
pub async fn attribute_conversion_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<AttributeConversionRequest>,
) -> Result<(StatusCode, Json<AttributeConversionResponse>), AppError> {
    actor.require_any(&[Role::Merchant])?;
    payload.validate()?;

    let result = state.attribution_service.attribute(payload.into()).await?;

    let status = if result.duplicate {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(result.into())))
}

/// `GET /api/conversions/{id}`
pub async fn get_conversion_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<ConversionResponse>, AppError> {
    let conversion = state.conversion_service.get(id).await?;
    actor.require_self_or_admin(conversion.affiliate_id)?;

    Ok(Json(conversion.into()))
}

/// Lists conversions, newest first.
///
/// # Endpoint
///
/// `GET /api/conversions?status=&campaign_id=&affiliate_id=&page=&page_size=`
///
/// Affiliates only ever see their own conversions.
pub async fn list_conversions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ConversionListQuery>,
) -> Result<Json<Paginated<ConversionResponse>>, AppError> {
    actor.require_any(&[Role::Affiliate])?;
    let (page, page_size) = query.pagination.resolve()?;

    let mut filter = ConversionFilter::new(page, page_size);
    if let Some(status) = query.status {
        filter = filter.with_status(status);
    }
    if let Some(campaign_id) = query.campaign_id {
        filter = filter.with_campaign(campaign_id);
    }

    let affiliate_id = if actor.is_admin() {
        query.affiliate_id
    } else {
        let own = query.affiliate_id.unwrap_or(actor.id);
        actor.require_self_or_admin(own)?;
        Some(own)
    };
    if let Some(affiliate_id) = affiliate_id {
        filter = filter.with_affiliate(affiliate_id);
    }

    let (items, total) = state.conversion_service.list(filter).await?;

    Ok(Json(Paginated::new(
        items.into_iter().map(Into::into).collect(),
        page,
        page_size,
        total,
    )))
}

/// `POST /api/conversions/{id}/approve` (admin)
///
/// # Errors
///
/// Returns 409 Conflict unless the conversion is `PENDING`.
pub async fn approve_conversion_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<ConversionResponse>, AppError> {
    actor.require_admin()?;

    let conversion = state.conversion_service.approve(id, actor.id).await?;
    Ok(Json(conversion.into()))
}

/// Rejects a pending conversion and reverses the money it added to the
/// link and campaign totals.
///
/// `POST /api/conversions/{id}/reject` (admin)
pub async fn reject_conversion_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<RejectConversionRequest>,
) -> Result<Json<ConversionResponse>, AppError> {
    actor.require_admin()?;
    payload.validate()?;

    let conversion = state
        .conversion_service
        .reject(id, actor.id, &payload.reason)
        .await?;

    Ok(Json(conversion.into()))
}
