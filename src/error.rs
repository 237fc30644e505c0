//! Application error type and its HTTP rendering.
//!
//! Every fallible operation in the service layer returns [`AppError`]. Handlers
//! return it directly and axum renders it through [`IntoResponse`] as
//!
//! ```json
//! { "error": { "code": "not_found", "message": "...", "details": {} } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serialized error payload, also embedded in batch responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Why a tracking code could not be served.
///
/// Checked in this order by the link resolver; the first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LinkUnavailable {
    #[error("Tracking link not found")]
    LinkNotFound,
    #[error("Tracking link is inactive")]
    LinkInactive,
    #[error("Campaign is not active")]
    CampaignNotActive,
    #[error("Tracking link has expired")]
    LinkExpired,
}

impl LinkUnavailable {
    /// 404 for links that do not (visibly) exist, 410 for links that existed but are gone.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::LinkNotFound | Self::LinkInactive => StatusCode::NOT_FOUND,
            Self::CampaignNotActive | Self::LinkExpired => StatusCode::GONE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::LinkNotFound => "link_not_found",
            Self::LinkInactive => "link_inactive",
            Self::CampaignNotActive => "campaign_not_active",
            Self::LinkExpired => "link_expired",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    Forbidden { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{0}")]
    LinkUnavailable(LinkUnavailable),

    #[error("{message}")]
    Conflict { message: String, details: Value },

    #[error("{message}")]
    InvalidState { message: String, details: Value },

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Could not generate a unique tracking code after {attempts} attempts")]
    CodeGenerationExhausted { attempts: usize },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_state(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidState {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Name of the unique constraint behind a database conflict.
    pub fn violated_constraint(&self) -> Option<&str> {
        match self {
            Self::Conflict { details, .. } => details.get("constraint")?.as_str(),
            _ => None,
        }
    }

    /// HTTP status this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::LinkUnavailable(reason) => reason.status(),
            Self::Conflict { .. } | Self::InvalidState { .. } => StatusCode::CONFLICT,
            Self::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CodeGenerationExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let message = self.to_string();
        let (code, details) = match self {
            Self::Validation { details, .. } => ("validation_error", details.clone()),
            Self::Unauthorized { details, .. } => ("unauthorized", details.clone()),
            Self::Forbidden { details, .. } => ("forbidden", details.clone()),
            Self::NotFound { details, .. } => ("not_found", details.clone()),
            Self::LinkUnavailable(reason) => (reason.code(), json!({})),
            Self::Conflict { details, .. } => ("conflict", details.clone()),
            Self::InvalidState { details, .. } => ("invalid_state", details.clone()),
            Self::InsufficientBalance {
                requested,
                available,
            } => (
                "insufficient_balance",
                json!({ "requested": requested, "available": available }),
            ),
            Self::CodeGenerationExhausted { attempts } => {
                ("code_generation_exhausted", json!({ "attempts": attempts }))
            }
            Self::Internal { details, .. } => ("internal_error", details.clone()),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl From<LinkUnavailable> for AppError {
    fn from(reason: LinkUnavailable) -> Self {
        Self::LinkUnavailable(reason)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        tracing::error!(error = %e, "Database error");
        AppError::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!({ "fields": errors.to_string() }))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}
