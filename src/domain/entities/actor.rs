//! Authenticated caller identity.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Merchant,
    Affiliate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Merchant => "merchant",
            Self::Affiliate => "affiliate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "merchant" => Ok(Self::Merchant),
            "affiliate" => Ok(Self::Affiliate),
            other => Err(AppError::bad_request(
                "Unknown role",
                json!({ "role": other, "allowed": ["admin", "merchant", "affiliate"] }),
            )),
        }
    }
}

/// The resolved caller of an API request.
///
/// Produced by the auth middleware and handed to handlers through request
/// extensions. Services only ever see `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Administrator role required",
                json!({ "role": self.role }),
            ))
        }
    }

    /// Allows the caller if it holds one of `roles` (admins always pass).
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if self.is_admin() || roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Role not permitted for this operation",
                json!({ "role": self.role, "allowed": roles }),
            ))
        }
    }

    /// Allows admins, or an affiliate acting on their own records.
    pub fn require_self_or_admin(&self, affiliate_id: i64) -> Result<(), AppError> {
        if self.is_admin() || (self.role == Role::Affiliate && self.id == affiliate_id) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Cannot access another affiliate's records",
                json!({ "affiliate_id": affiliate_id }),
            ))
        }
    }
}
