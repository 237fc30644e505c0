//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Resolves the Bearer token to an [`Actor`](crate::domain::entities::Actor)
/// and stores it in the request extensions for handlers to extract with
/// `Extension<Actor>`.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing or malformed, or the
/// token is unknown or revoked. Role checks happen in the handlers.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let actor = st.auth_service.authenticate(&token).await?;
    tracing::debug!(actor_id = actor.id, role = %actor.role, "Authenticated");

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
