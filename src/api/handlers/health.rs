//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: all components healthy
/// - **503 Service Unavailable**: one or more components degraded
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "click_queue": { "status": "ok", "message": "Free slots: 10000/10000" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let click_queue = check_click_queue(&state);

    let all_healthy = database.is_ok() && click_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            click_queue,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match sqlx::query("SELECT 1").execute(state.db.as_ref()).await {
        Ok(_) => CheckStatus::ok("Connected"),
        Err(e) => {
            tracing::error!(error = %e, "Health check database ping failed");
            CheckStatus::error("Database unreachable")
        }
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.click_sender.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Free slots: {}/{}",
            state.click_sender.capacity(),
            state.click_sender.max_capacity()
        ))
    }
}
