/// In-memory persistence
///
/// Implements both collaborator traits behind a single mutex so the
/// check-then-insert uniqueness paths and compare-and-revoke are atomic,
/// matching what a relational backend gets from unique constraints and
/// row-level updates. Intended for tests and embedded hosts; everything is
/// lost on drop.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{RefreshTokenRecord, User};
use crate::store::{RefreshTokenPersistence, UserStore};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    tokens: HashMap<String, RefreshTokenRecord>,
}

/// Mutex-guarded in-memory implementation of `UserStore` and
/// `RefreshTokenPersistence`
#[derive(Default)]
pub struct InMemoryIdentityStore {
    state: Mutex<State>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user and all of their token rows. Stands in for the
    /// host-side deletion path; the cascade mirrors a relational
    /// `ON DELETE CASCADE`.
    pub fn delete_user(&self, user_id: Uuid) -> bool {
        let mut state = self.state.lock();
        let existed = state.users.remove(&user_id).is_some();
        state.tokens.retain(|_, record| record.user_id != user_id);
        existed
    }

    /// Number of token rows currently held, live or not.
    pub fn token_row_count(&self) -> usize {
        self.state.lock().tokens.len()
    }
}

#[async_trait]
impl UserStore for InMemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock();
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock();
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let state = self.state.lock();
        Ok(state.users.get(&id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let taken = state
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(StoreError::UniqueViolation(
                "username or email already taken".to_string(),
            ));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenPersistence for InMemoryIdentityStore {
    async fn delete_stale(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.state.lock();
        let before = state.tokens.len();
        state
            .tokens
            .retain(|_, record| record.user_id != user_id || record.is_usable(now));
        Ok((before - state.tokens.len()) as u64)
    }

    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if state.tokens.contains_key(&record.token) {
            return Err(StoreError::UniqueViolation(
                "token value already exists".to_string(),
            ));
        }
        state.tokens.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let state = self.state.lock();
        Ok(state.tokens.get(token).cloned())
    }

    async fn mark_revoked(&self, token: &str) -> Result<u64, StoreError> {
        let mut state = self.state.lock();
        match state.tokens.get_mut(token) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn mark_all_revoked(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.lock();
        let mut affected = 0;
        for record in state.tokens.values_mut() {
            if record.user_id == user_id && !record.revoked {
                record.revoked = true;
                affected += 1;
            }
        }
        Ok(affected)
    }
}
