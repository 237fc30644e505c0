//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`]; role checks are done per handler.

use crate::api::handlers::{
    approve_conversion_handler, attribute_conversion_handler, campaign_stats_handler,
    create_campaign_handler, create_link_handler, create_payment_request_handler,
    earnings_handler, get_campaign_handler, get_conversion_handler, get_link_handler,
    get_payment_request_handler, list_affiliate_links_handler, list_conversions_handler,
    payment_history_handler, process_payment_request_handler, reject_conversion_handler,
    update_campaign_status_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// All API routes.
///
/// # Endpoints
///
/// - `POST  /campaigns`                          - Create campaign (admin)
/// - `GET   /campaigns/{id}`                     - Campaign details
/// - `PATCH /campaigns/{id}/status`              - Change campaign status (admin)
/// - `GET   /campaigns/{id}/stats`               - Campaign stats (admin, merchant)
/// - `POST  /links`                              - Create affiliate link
/// - `GET   /links/{id}`                         - Link details
/// - `PATCH /links/{id}`                         - Activate / deactivate link
/// - `POST  /conversions`                        - Attribute an order (merchant, admin)
/// - `GET   /conversions`                        - List conversions
/// - `GET   /conversions/{id}`                   - Conversion details
/// - `POST  /conversions/{id}/approve`           - Approve (admin)
/// - `POST  /conversions/{id}/reject`            - Reject (admin)
/// - `POST  /payment-requests`                   - Request a withdrawal
/// - `GET   /payment-requests/{id}`              - Payment request details
/// - `POST  /payment-requests/{id}/process`      - Process a request (admin)
/// - `GET   /affiliates/{id}/links`              - Affiliate's links
/// - `GET   /affiliates/{id}/earnings`           - Earnings report
/// - `GET   /affiliates/{id}/payment-requests`   - Payment request history
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/campaigns", post(create_campaign_handler))
        .route("/campaigns/{id}", get(get_campaign_handler))
        .route("/campaigns/{id}/status", patch(update_campaign_status_handler))
        .route("/campaigns/{id}/stats", get(campaign_stats_handler))
        .route("/links", post(create_link_handler))
        .route(
            "/links/{id}",
            get(get_link_handler).patch(update_link_handler),
        )
        .route(
            "/conversions",
            get(list_conversions_handler).post(attribute_conversion_handler),
        )
        .route("/conversions/{id}", get(get_conversion_handler))
        .route("/conversions/{id}/approve", post(approve_conversion_handler))
        .route("/conversions/{id}/reject", post(reject_conversion_handler))
        .route("/payment-requests", post(create_payment_request_handler))
        .route("/payment-requests/{id}", get(get_payment_request_handler))
        .route(
            "/payment-requests/{id}/process",
            post(process_payment_request_handler),
        )
        .route("/affiliates/{id}/links", get(list_affiliate_links_handler))
        .route("/affiliates/{id}/earnings", get(earnings_handler))
        .route(
            "/affiliates/{id}/payment-requests",
            get(payment_history_handler),
        )
}
