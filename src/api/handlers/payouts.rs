//! Handlers for earnings reports and payment requests.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::pagination::{Paginated, PaginationParams};
use crate::api::dto::payouts::{
    CreatePaymentRequestRequest, EarningsQuery, EarningsResponse, PaymentRequestResponse,
    ProcessPaymentRequest, ProcessPaymentResponse,
};
use crate::application::services::RequestPayout;
use crate::domain::entities::{Actor, Role};
use crate::error::AppError;
use crate::state::AppState;

/// Earnings breakdown and withdrawable balance.
///
/// # Endpoint
///
/// `GET /api/affiliates/{affiliate_id}/earnings?currency=USD&from=&to=`
///
/// The range narrows the breakdown; `available_for_withdrawal` always covers
/// all time.
pub async fn earnings_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(affiliate_id): Path<i64>,
    Query(query): Query<EarningsQuery>,
) -> Result<Json<EarningsResponse>, AppError> {
    actor.require_self_or_admin(affiliate_id)?;

    let report = state
        .payout_service
        .earnings_report(affiliate_id, &query.currency, query.range.from, query.range.to)
        .await?;

    Ok(Json(EarningsResponse::new(affiliate_id, report)))
}

/// Opens a withdrawal request.
///
/// # Endpoint
///
/// `POST /api/payment-requests` (affiliate, admin)
///
/// # Errors
///
/// Returns 422 Unprocessable Entity with the available balance if the amount
/// exceeds it.
pub async fn create_payment_request_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreatePaymentRequestRequest>,
) -> Result<(StatusCode, Json<PaymentRequestResponse>), AppError> {
    actor.require_any(&[Role::Affiliate])?;
    payload.validate()?;

    let affiliate_id = payload.affiliate_id.unwrap_or(actor.id);
    actor.require_self_or_admin(affiliate_id)?;

    let request = state
        .payout_service
        .create_request(RequestPayout {
            affiliate_id,
            amount: payload.amount,
            currency: payload.currency,
            period_start: payload.period_start,
            period_end: payload.period_end,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(request.into())))
}

/// `GET /api/payment-requests/{id}`
pub async fn get_payment_request_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<PaymentRequestResponse>, AppError> {
    let request = state.payout_service.get_request(id).await?;
    actor.require_self_or_admin(request.affiliate_id)?;

    Ok(Json(request.into()))
}

/// `GET /api/affiliates/{affiliate_id}/payment-requests?page=&page_size=`
pub async fn payment_history_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(affiliate_id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<PaymentRequestResponse>>, AppError> {
    actor.require_self_or_admin(affiliate_id)?;
    let (page, page_size) = pagination.resolve()?;

    let (items, total) = state
        .payout_service
        .history(affiliate_id, page, page_size)
        .await?;

    Ok(Json(Paginated::new(
        items.into_iter().map(Into::into).collect(),
        page,
        page_size,
        total,
    )))
}

/// Applies an administrative decision to a payment request.
///
/// # Endpoint
///
/// `POST /api/payment-requests/{id}/process` (admin)
///
/// Completing a request claims the approved, unpaid conversions of its
/// period; the number and sum claimed are returned.
pub async fn process_payment_request_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<ProcessPaymentRequest>,
) -> Result<Json<ProcessPaymentResponse>, AppError> {
    actor.require_admin()?;

    let settlement = state
        .payout_service
        .process_request(id, payload.into(), actor.id)
        .await?;

    Ok(Json(settlement.into()))
}
