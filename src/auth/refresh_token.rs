/// Refresh Token Management
///
/// Refresh tokens are opaque bearer secrets: 32 cryptographically random
/// bytes, URL-safe base64, carrying no embedded claims and looked up only
/// against the persistence store. A token moves Active -> Revoked exactly
/// once (rotation or logout) or dies implicitly by expiry; there is no way
/// back out of either. Consumed rows are kept for audit until the next
/// `create` for the same user sweeps them.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use rand::RngCore;
use uuid::Uuid;

use crate::error::{AuthError, StoreError};
use crate::models::{RefreshTokenRecord, User};
use crate::store::{RefreshTokenPersistence, UserStore};

/// Retry budget for the (negligible-probability) token-value collision.
const MAX_CREATE_ATTEMPTS: usize = 3;

/// Generate a new opaque refresh token value.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Creates, validates, and revokes refresh tokens against a persistence
/// collaborator
pub struct RefreshTokenStore {
    tokens: Arc<dyn RefreshTokenPersistence>,
    users: Arc<dyn UserStore>,
    lifetime_seconds: i64,
}

impl RefreshTokenStore {
    pub fn new(
        tokens: Arc<dyn RefreshTokenPersistence>,
        users: Arc<dyn UserStore>,
        lifetime_seconds: i64,
    ) -> Self {
        Self {
            tokens,
            users,
            lifetime_seconds,
        }
    }

    /// Create a new refresh token for a user.
    ///
    /// First sweeps the user's expired and revoked rows (amortized garbage
    /// collection; no background sweeper exists). The sweep is best-effort:
    /// a failure is logged and does not block issuance. A token-value
    /// collision from the store's unique constraint is retried with a fresh
    /// value rather than surfaced to the caller.
    pub async fn create(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        match self.tokens.delete_stale(user_id, now).await {
            Ok(reclaimed) if reclaimed > 0 => {
                tracing::debug!(user_id = %user_id, reclaimed, "reclaimed stale refresh tokens");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "stale token sweep failed");
            }
        }

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let token = generate_refresh_token();
            let record = RefreshTokenRecord {
                id: Uuid::new_v4(),
                user_id,
                token: token.clone(),
                expires_at: now + Duration::seconds(self.lifetime_seconds),
                revoked: false,
            };
            match self.tokens.insert(&record).await {
                Ok(()) => {
                    tracing::debug!(user_id = %user_id, "refresh token created");
                    return Ok(token);
                }
                Err(StoreError::UniqueViolation(_)) => {
                    tracing::warn!(user_id = %user_id, "refresh token value collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AuthError::Store(StoreError::Backend(
            "exhausted refresh token creation attempts".to_string(),
        )))
    }

    /// Look up a token and resolve its owning user.
    ///
    /// Read-only: rotation decisions belong to the caller, which is what
    /// lets `CredentialManager` decide atomically whether to rotate.
    /// Returns `None` when the token is absent, revoked, expired, or its
    /// owner no longer exists.
    pub async fn validate(&self, token: &str) -> Result<Option<User>, AuthError> {
        let Some(record) = self.tokens.find_by_token(token).await? else {
            return Ok(None);
        };
        if !record.is_usable(Utc::now()) {
            return Ok(None);
        }
        // A missing owner means the user was deleted; the orphaned row is
        // unusable and will be reaped by the next sweep.
        Ok(self.users.find_by_id(record.user_id).await?)
    }

    /// Revoke a token, returning whether a live row was actually revoked.
    ///
    /// Revoking an unknown or already-revoked token is a silent no-op
    /// (`Ok(false)`), which avoids leaking which tokens exist. The returned
    /// flag is the rows-affected observation from the store's
    /// compare-and-revoke; rotation uses it to resolve races.
    pub async fn revoke(&self, token: &str) -> Result<bool, AuthError> {
        let affected = self.tokens.mark_revoked(token).await?;
        if affected > 0 {
            tracing::debug!("refresh token revoked");
        }
        Ok(affected > 0)
    }

    /// Revoke every live token belonging to a user (logout everywhere).
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let affected = self.tokens.mark_all_revoked(user_id).await?;
        tracing::info!(user_id = %user_id, affected, "all refresh tokens revoked for user");
        Ok(affected)
    }
}
