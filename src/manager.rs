/// Credential Manager
///
/// Orchestrates registration, login, and refresh rotation over the user
/// store, the access token issuer, and the refresh token store. Built once
/// at process start with explicit references; no component below this one
/// combines all three responsibilities.
///
/// # Security Notes
/// - Login uses the same error for "not found" and "wrong password" to
///   prevent user enumeration; registration likewise never discloses
///   whether the username or the email collided.
/// - Refresh revokes the presented token *before* issuing replacements.
///   If issuance fails after revocation the caller is logged out rather
///   than left holding two valid tokens (fail-safe, not fail-open).
/// - A real deployment would add rate limiting in front of `login` and
///   `refresh`; that belongs to the host, not this core.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{hash_password, verify_password, AccessTokenIssuer, RefreshTokenStore};
use crate::error::{AuthError, StoreError};
use crate::models::User;
use crate::store::UserStore;

/// An access/refresh token pair returned by login and refresh
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Entry point for the credential/session lifecycle
pub struct CredentialManager {
    users: Arc<dyn UserStore>,
    issuer: AccessTokenIssuer,
    refresh_tokens: RefreshTokenStore,
    pbkdf2_iterations: u32,
}

impl CredentialManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        issuer: AccessTokenIssuer,
        refresh_tokens: RefreshTokenStore,
        pbkdf2_iterations: u32,
    ) -> Self {
        Self {
            users,
            issuer,
            refresh_tokens,
            pbkdf2_iterations,
        }
    }

    /// Register a new user.
    ///
    /// Fails with `AuthError::Conflict` if the username or email already
    /// resolves to a user, without revealing which field collided. The
    /// store's unique constraint backstops the check-then-create window:
    /// a uniqueness violation during create reports the same conflict.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let existing = match self.users.find_by_username(username).await? {
            Some(user) => Some(user),
            None => self.users.find_by_email(email).await?,
        };
        if existing.is_some() {
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(password, self.pbkdf2_iterations);
        let user = User::new(username, email, password_hash);

        match self.users.create(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, "user registered");
                Ok(user)
            }
            Err(StoreError::UniqueViolation(_)) => Err(AuthError::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate with a username or email and a password.
    ///
    /// On success returns one access token and one freshly created refresh
    /// token. Every failure is `AuthError::InvalidCredentials`.
    pub async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<TokenPair, AuthError> {
        let user = match self.users.find_by_username(username_or_email).await? {
            Some(user) => Some(user),
            None => self.users.find_by_email(username_or_email).await?,
        };
        let Some(user) = user else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(&user.password_hash, password) {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issuer.issue(&user, None)?;
        let refresh_token = self.refresh_tokens.create(user.id).await?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Rotate a refresh token.
    ///
    /// Validates the presented token (read-only), then compare-and-revokes
    /// it, then issues a new access/refresh pair for the same user. When
    /// two callers race on the same token, the revoke step admits exactly
    /// one of them; the loser gets `AuthError::InvalidToken` like any other
    /// unusable token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.refresh_tokens.validate(refresh_token).await? else {
            return Err(AuthError::InvalidToken);
        };

        // Revoke before issuing. Losing the race here means another refresh
        // already consumed this token.
        if !self.refresh_tokens.revoke(refresh_token).await? {
            return Err(AuthError::InvalidToken);
        }

        let access_token = self.issuer.issue(&user, None)?;
        let new_refresh_token = self.refresh_tokens.create(user.id).await?;

        tracing::info!(user_id = %user.id, "refresh token rotated");
        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh_token,
        })
    }

    /// Revoke a refresh token (logout). Idempotent; unknown tokens are a
    /// silent no-op.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_tokens.revoke(refresh_token).await?;
        Ok(())
    }

    /// Revoke every outstanding refresh token for a user (logout
    /// everywhere). Returns the number of tokens revoked.
    pub async fn logout_all(&self, user_id: Uuid) -> Result<u64, AuthError> {
        self.refresh_tokens.revoke_all(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::IdentitySettings;
    use crate::memory::InMemoryIdentityStore;

    fn test_settings() -> IdentitySettings {
        IdentitySettings {
            signing_key: "supersecret_signing_key_1234567890123456".to_string(),
            issuer: "test-issuer".to_string(),
            audience: "test-audience".to_string(),
            access_token_expiry: 300,
            refresh_token_expiry: 86_400,
            pbkdf2_iterations: 1_000,
        }
    }

    fn manager(store: Arc<InMemoryIdentityStore>) -> CredentialManager {
        let settings = test_settings();
        let issuer = AccessTokenIssuer::new(settings.clone()).unwrap();
        let refresh_tokens =
            RefreshTokenStore::new(store.clone(), store.clone(), settings.refresh_token_expiry);
        CredentialManager::new(store, issuer, refresh_tokens, settings.pbkdf2_iterations)
    }

    #[tokio::test]
    async fn register_hashes_the_password() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let manager = manager(store.clone());

        let user = manager
            .register("alice", "alice@example.com", "Secr3t!")
            .await
            .unwrap();
        assert_ne!(user.password_hash, "Secr3t!");
        assert!(verify_password(&user.password_hash, "Secr3t!"));
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let manager = manager(store.clone());
        manager
            .register("alice", "alice@example.com", "pw")
            .await
            .unwrap();

        let by_name = manager.register("alice", "other@example.com", "pw").await;
        assert!(matches!(by_name, Err(AuthError::Conflict)));

        let by_email = manager.register("bob", "alice@example.com", "pw").await;
        assert!(matches!(by_email, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_works_with_username_or_email() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let manager = manager(store.clone());
        manager
            .register("alice", "alice@example.com", "Secr3t!")
            .await
            .unwrap();

        assert!(manager.login("alice", "Secr3t!").await.is_ok());
        assert!(manager.login("alice@example.com", "Secr3t!").await.is_ok());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let manager = manager(store.clone());
        manager
            .register("alice", "alice@example.com", "Secr3t!")
            .await
            .unwrap();

        let wrong_password = manager.login("alice", "wrong").await.unwrap_err();
        let unknown_user = manager.login("ghost", "Secr3t!").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_rotates_and_kills_the_old_token() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let manager = manager(store.clone());
        manager
            .register("alice", "alice@example.com", "Secr3t!")
            .await
            .unwrap();
        let pair = manager.login("alice", "Secr3t!").await.unwrap();

        let rotated = manager.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let replay = manager.refresh(&pair.refresh_token).await;
        assert!(matches!(replay, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn concurrent_refreshes_admit_exactly_one_winner() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let manager = Arc::new(manager(store.clone()));
        manager
            .register("alice", "alice@example.com", "Secr3t!")
            .await
            .unwrap();
        let pair = manager.login("alice", "Secr3t!").await.unwrap();

        let (a, b) = tokio::join!(
            manager.refresh(&pair.refresh_token),
            manager.refresh(&pair.refresh_token)
        );
        assert_eq!(
            a.is_ok() as u8 + b.is_ok() as u8,
            1,
            "exactly one refresh must win"
        );
    }

    #[tokio::test]
    async fn logout_revokes_and_is_idempotent() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let manager = manager(store.clone());
        manager
            .register("alice", "alice@example.com", "Secr3t!")
            .await
            .unwrap();
        let pair = manager.login("alice", "Secr3t!").await.unwrap();

        manager.logout(&pair.refresh_token).await.unwrap();
        assert!(manager.refresh(&pair.refresh_token).await.is_err());
        // Logging out again, or with a token that never existed, is fine.
        manager.logout(&pair.refresh_token).await.unwrap();
        manager.logout("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn logout_all_revokes_every_session() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let manager = manager(store.clone());
        let user = manager
            .register("alice", "alice@example.com", "Secr3t!")
            .await
            .unwrap();

        let first = manager.login("alice", "Secr3t!").await.unwrap();
        let second = manager.login("alice", "Secr3t!").await.unwrap();

        assert_eq!(manager.logout_all(user.id).await.unwrap(), 2);
        assert!(manager.refresh(&first.refresh_token).await.is_err());
        assert!(manager.refresh(&second.refresh_token).await.is_err());
    }
}
