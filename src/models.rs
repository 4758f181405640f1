/// Persisted data model
///
/// `User` and `RefreshTokenRecord` are independent rows linked only by
/// `user_id`. There is deliberately no in-memory User-to-tokens collection:
/// the token side holds a one-way foreign reference and the persistence
/// layer owns the index.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One registered principal
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    /// Unique across all users.
    pub username: String,
    /// Unique across all users.
    pub email: String,
    /// Opaque record produced only by `auth::hash_password`.
    pub password_hash: String,
    pub display_name: String,
    pub email_confirmed: bool,
}

impl User {
    /// Build a new user for registration. The display name defaults to the
    /// username; email confirmation is a host-side flow and starts false.
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            display_name: username.to_string(),
            email_confirmed: false,
        }
    }
}

/// One outstanding (or historical) refresh credential
///
/// Rows are revoked rather than deleted when consumed, so a replayed token
/// is observably dead instead of merely absent. Stale rows are reclaimed
/// lazily by the next `RefreshTokenStore::create` for the same user.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque token secret, unique across all rows live or not.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshTokenRecord {
    /// A token is usable iff it is neither revoked nor expired.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}
