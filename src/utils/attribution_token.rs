//! Signed attribution tokens.
//!
//! A token binds a conversion to the click that produced it:
//!
//! ```text
//! base64url("{link_id}.{click_id}.{issued_unix}.{expires_unix}") "." hex(hmac_sha256(secret, payload_b64))
//! ```
//!
//! Tracking codes never contain a `.`, so callers can tell both reference
//! kinds apart with [`is_signed_token`].

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Decoded and verified token contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionClaims {
    pub link_id: i64,
    pub click_id: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies attribution tokens with a fixed window.
#[derive(Clone)]
pub struct AttributionSigner {
    secret: Vec<u8>,
    window: Duration,
}

impl std::fmt::Debug for AttributionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributionSigner")
            .field("window_days", &self.window.num_days())
            .finish_non_exhaustive()
    }
}

pub fn is_signed_token(reference: &str) -> bool {
    reference.contains('.')
}

impl AttributionSigner {
    pub fn new(secret: impl Into<Vec<u8>>, window_days: i64) -> Self {
        Self {
            secret: secret.into(),
            window: Duration::days(window_days),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::internal("Invalid attribution key", json!({ "reason": e.to_string() })))?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }

    /// Issues a token for a recorded click, valid for the configured window.
    pub fn issue(
        &self,
        link_id: i64,
        click_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let expires_at = now + self.window;
        let payload = URL_SAFE_NO_PAD.encode(format!(
            "{link_id}.{click_id}.{}.{}",
            now.timestamp(),
            expires_at.timestamp()
        ));
        let signature = hex::encode(self.mac(&payload)?.finalize().into_bytes());

        Ok((format!("{payload}.{signature}"), expires_at))
    }

    /// Verifies signature and expiry.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the token is malformed or its signature
    ///   does not match
    /// - [`AppError::InvalidState`] if the attribution window has elapsed
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AttributionClaims, AppError> {
        let malformed = |reason: &str| {
            AppError::bad_request("Invalid attribution token", json!({ "reason": reason }))
        };

        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| malformed("missing signature"))?;
        let signature = hex::decode(signature).map_err(|_| malformed("signature is not hex"))?;

        self.mac(payload)?
            .verify_slice(&signature)
            .map_err(|_| malformed("bad signature"))?;

        let decoded = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| malformed("payload is not base64url text"))?;

        let fields: Vec<i64> = decoded
            .split('.')
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| malformed("payload field is not an integer"))?;
        let [link_id, click_id, issued, expires] = fields[..] else {
            return Err(malformed("payload must have four fields"));
        };

        let timestamp = |secs: i64| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .ok_or_else(|| malformed("timestamp out of range"))
        };
        let claims = AttributionClaims {
            link_id,
            click_id,
            issued_at: timestamp(issued)?,
            expires_at: timestamp(expires)?,
        };

        if now >= claims.expires_at {
            return Err(AppError::invalid_state(
                "Attribution window elapsed",
                json!({ "expired_at": claims.expires_at }),
            ));
        }

        Ok(claims)
    }
}
