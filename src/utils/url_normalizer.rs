//! Destination URL normalization.
//!
//! Link destinations are stored in canonical form so the redirect target is
//! stable regardless of how the URL was typed.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Normalizes a redirect destination.
///
/// - only `http` and `https` are accepted
/// - embedded credentials are rejected
/// - the host is lowercased, the default port and the fragment are dropped
/// - path and query are preserved as given
///
/// # Errors
///
/// Returns [`AppError::Validation`] with the failing reason in `details`.
pub fn normalize_url(input: &str) -> Result<String, AppError> {
    let invalid = |reason: &str| {
        AppError::bad_request(
            "Invalid destination URL",
            json!({ "url": input, "reason": reason }),
        )
    };

    let mut url = Url::parse(input.trim()).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("only http and https are allowed"));
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("credentials are not allowed"));
    }

    let host = url
        .host_str()
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| invalid("missing host"))?;
    url.set_host(Some(&host))
        .map_err(|e| invalid(&e.to_string()))?;

    url.set_fragment(None);

    if matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        url.set_port(None).map_err(|_| invalid("cannot drop port"))?;
    }

    Ok(url.to_string())
}
