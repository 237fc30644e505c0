//! Public tracking endpoints: click redirect and pixel.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Duration;
use std::net::SocketAddr;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::RequestMetadata;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::{client_country, client_ip};

/// Transparent 1x1 RGBA PNG.
const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Records a click and redirects the visitor to the link's destination.
///
/// # Endpoint
///
/// `GET /track/click/{code}`
///
/// # Response
///
/// `302 Found` with `Location` set to the destination and a `Set-Cookie`
/// carrying the signed attribution token for the configured window.
///
/// # Errors
///
/// - `404` if the code is unknown or the link is inactive
/// - `410` if the campaign is not running or the link has expired
///
/// Nothing is recorded when the link cannot be served.
pub async fn click_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let metadata = request_metadata(&headers, addr, state.behind_proxy);

    let receipt = state.click_service.record_click(&code, metadata).await?;

    let cookie = attribution_cookie(
        &state.attribution_cookie,
        &receipt.attribution_token,
        state.click_service.attribution_window(),
    );

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, receipt.redirect_url),
            (header::SET_COOKIE, cookie),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    )
        .into_response())
}

/// Serves a tracking pixel and queues the click for background recording.
///
/// # Endpoint
///
/// `GET /track/pixel/{code}`
///
/// Always answers `200` with a transparent PNG. Unknown or expired codes are
/// discarded by the worker; a full queue drops the event.
pub async fn pixel_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let metadata = request_metadata(&headers, addr, state.behind_proxy);

    match state.click_sender.try_send(ClickEvent::new(code, metadata)) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            metrics::counter!("clicks_dropped_total", "reason" => "queue_full").increment(1);
            tracing::warn!(code = %event.code, "Click queue full, pixel hit dropped");
        }
        Err(TrySendError::Closed(event)) => {
            metrics::counter!("clicks_dropped_total", "reason" => "queue_closed").increment(1);
            tracing::error!(code = %event.code, "Click queue closed, pixel hit dropped");
        }
    }

    pixel_response()
}

fn pixel_response() -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
        ],
        PIXEL_PNG,
    )
        .into_response()
}

fn request_metadata(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> RequestMetadata {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    RequestMetadata {
        ip: Some(client_ip(headers, peer, behind_proxy)),
        user_agent: header_str(header::USER_AGENT),
        referer: header_str(header::REFERER),
        country: client_country(headers),
        visitor_id: headers
            .get("x-visitor-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= 64)
            .map(str::to_string),
    }
}

fn attribution_cookie(name: &str, token: &str, window: Duration) -> String {
    format!(
        "{name}={token}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        window.num_seconds()
    )
}
