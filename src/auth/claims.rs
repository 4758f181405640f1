/// JWT Claims structure
///
/// Payload of an issued access token: subject, unique-name and email
/// claims plus standard time bounds (RFC 7519). Caller-supplied extra
/// claims are flattened into the payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Claims carried by access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Unique-name claim (username)
    pub unique_name: String,
    /// User email
    pub email: String,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Caller-supplied extra claims, flattened into the payload
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        unique_name: &str,
        email: &str,
        lifetime_seconds: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            unique_name: unique_name.to_string(),
            email: email.to_string(),
            nbf: now,
            exp: now + lifetime_seconds,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            extra: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, extra: HashMap<String, String>) -> Self {
        self.extra = extra;
        self
    }

    /// Extract the user ID from the subject claim.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::TokenGeneration("invalid user ID in token".to_string()))
    }

    pub fn is_expired(&self) -> bool {
        self.exp < chrono::Utc::now().timestamp()
    }
}
