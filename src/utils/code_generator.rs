//! Tracking code generation and alias validation.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Lowercase base36 alphabet used for generated codes.
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated tracking codes.
///
/// 36^8 is about 2.8e12 codes, so collisions stay rare well past millions of links.
pub const CODE_LENGTH: usize = 8;

/// Words that cannot be claimed as custom aliases.
const RESERVED_CODES: &[&str] = &[
    "affiliates",
    "campaigns",
    "conversions",
    "dashboard",
    "payments",
    "payouts",
    "tracking",
];

/// Generates a random base36 tracking code of [`CODE_LENGTH`] characters.
///
/// Uniqueness is not guaranteed here; the registry checks the store and
/// retries on collision.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Validates a custom alias requested for a link.
///
/// # Rules
///
/// - Length: 8-15 characters
/// - Allowed characters: lowercase letters, digits, hyphens
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved word
///
/// # Errors
///
/// Returns [`AppError::Validation`] naming the violated rule.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if !(8..=15).contains(&code.len()) {
        return Err(AppError::bad_request(
            "Custom alias must be 8-15 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if let Some(bad) = code
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(AppError::bad_request(
            "Custom alias can only contain lowercase letters, digits, and hyphens",
            json!({ "code": code, "invalid_char": bad.to_string() }),
        ));
    }

    if code.starts_with('-') || code.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom alias cannot start or end with a hyphen",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
