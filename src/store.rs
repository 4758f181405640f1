/// Persistence collaborator contracts
///
/// The crate owns no storage engine. Hosts plug in implementations of these
/// traits; `memory::InMemoryIdentityStore` implements both for tests and
/// embedded use. Implementations must enforce unique constraints on
/// username, email, and token value, and must provide read-your-writes
/// ordering within a single credential operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{RefreshTokenRecord, User};

/// Durable store for user rows
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Resolve a token's owning user. Returns `None` for deleted users, which
    /// is how orphaned refresh tokens become unusable without a cascade.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Persist a new user. Must fail with `StoreError::UniqueViolation` if
    /// the username or email is already taken.
    async fn create(&self, user: &User) -> Result<(), StoreError>;
}

/// Durable store for refresh token rows
#[async_trait]
pub trait RefreshTokenPersistence: Send + Sync {
    /// Delete this user's rows that are revoked or expired as of `now`.
    /// Returns the number of rows removed.
    async fn delete_stale(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Persist a new token row. Must fail with `StoreError::UniqueViolation`
    /// on a token-value collision.
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Compare-and-revoke: mark the row revoked only if it is not already,
    /// returning the number of rows affected. This must be atomic with
    /// respect to concurrent calls for the same token; it is the primitive
    /// that makes two racing refreshes resolve to exactly one winner.
    async fn mark_revoked(&self, token: &str) -> Result<u64, StoreError>;

    /// Revoke every live token belonging to `user_id`, returning the count.
    async fn mark_all_revoked(&self, user_id: Uuid) -> Result<u64, StoreError>;
}
