//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::Actor;
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 keyed by `secret`.
///
/// Returns a 64-character lowercase hex digest. The admin CLI uses the same
/// function when minting tokens.
pub fn hash_token(secret: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Resolves Bearer tokens to the [`Actor`] they were issued for.
///
/// Tokens are compared by keyed digest, so read access to the database is not
/// enough to forge one.
pub struct AuthService<R: TokenRepository> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository> AuthService<R> {
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token.
    ///
    /// On success the token's `last_used_at` is refreshed; a failure to do so
    /// is logged and does not fail the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    pub async fn authenticate(&self, token: &str) -> Result<Actor, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let stored = self
            .repository
            .find_active(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized("Unauthorized", json!({"reason": "Invalid or revoked token"}))
            })?;

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            tracing::warn!(token_id = stored.id, error = %e, "Failed to update token usage");
        }

        Ok(Actor {
            id: stored.actor_id,
            role: stored.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Role;
    use crate::domain::repositories::{ApiToken, MockTokenRepository};
    use chrono::Utc;

    const SECRET: &str = "test-signing-secret";

    fn stored(hash: &str, actor_id: i64, role: Role) -> ApiToken {
        ApiToken {
            id: 1,
            name: "ci".to_string(),
            token_hash: hash.to_string(),
            actor_id,
            role,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_returns_actor() {
        let expected_hash = hash_token(SECRET, "valid-token");

        let mut repo = MockTokenRepository::new();
        repo.expect_find_active()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(|hash| Ok(Some(stored(hash, 42, Role::Affiliate))));
        repo.expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let service = AuthService::new(Arc::new(repo), SECRET.to_string());
        let actor = service.authenticate("valid-token").await.unwrap();

        assert_eq!(actor.id, 42);
        assert_eq!(actor.role, Role::Affiliate);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let mut repo = MockTokenRepository::new();
        repo.expect_find_active().times(1).returning(|_| Ok(None));
        repo.expect_update_last_used().never();

        let service = AuthService::new(Arc::new(repo), SECRET.to_string());

        assert!(matches!(
            service.authenticate("invalid-token").await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_usage_update_failure_is_ignored() {
        let mut repo = MockTokenRepository::new();
        repo.expect_find_active()
            .returning(|hash| Ok(Some(stored(hash, 1, Role::Admin))));
        repo.expect_update_last_used()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = AuthService::new(Arc::new(repo), SECRET.to_string());
        assert!(service.authenticate("token").await.is_ok());
    }

    #[test]
    fn test_hash_token_shape() {
        let hash = hash_token(SECRET, "test-token");
        assert_eq!(hash, hash_token(SECRET, "test-token"));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_token(SECRET, "other-token"));
    }

    #[test]
    fn test_hash_token_secret_matters() {
        assert_ne!(hash_token("secret-a", "token"), hash_token("secret-b", "token"));
    }
}
