/// Access Token Issuance
///
/// Mints compact, HS256-signed JWTs carrying user identity claims. The
/// issuer holds no mutable state; configuration is validated once at
/// construction and a missing signing key, issuer, or audience is fatal at
/// startup rather than a per-call failure.
///
/// Inbound verification is the resource server's concern, but the produced
/// format must be independently verifiable; `decode_access_token` exists to
/// prove that and for hosts that co-locate both roles.

use std::collections::HashMap;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::IdentitySettings;
use crate::error::AuthError;
use crate::models::User;

/// Issues signed, time-bounded access tokens
pub struct AccessTokenIssuer {
    settings: IdentitySettings,
    encoding_key: EncodingKey,
}

impl AccessTokenIssuer {
    /// Build an issuer from validated settings.
    ///
    /// # Errors
    /// Returns a configuration error if the signing key, issuer, or
    /// audience is missing or empty.
    pub fn new(settings: IdentitySettings) -> Result<Self, AuthError> {
        settings.validate()?;
        let encoding_key = EncodingKey::from_secret(settings.signing_key.as_bytes());
        Ok(Self {
            settings,
            encoding_key,
        })
    }

    /// Mint an access token for a user, with optional extra claims.
    pub fn issue(
        &self,
        user: &User,
        extra_claims: Option<HashMap<String, String>>,
    ) -> Result<String, AuthError> {
        let mut claims = Claims::new(
            user.id,
            &user.username,
            &user.email,
            self.settings.access_token_expiry,
            &self.settings.issuer,
            &self.settings.audience,
        );
        if let Some(extra) = extra_claims {
            claims = claims.with_extra(extra);
        }

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Access token lifetime in seconds, for hosts that report `expires_in`.
    pub fn token_lifetime(&self) -> i64 {
        self.settings.access_token_expiry
    }
}

/// Decode and verify an access token against the configured issuer,
/// audience, and signing key.
pub fn decode_access_token(token: &str, settings: &IdentitySettings) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&settings.issuer]);
    validation.set_audience(&[&settings.audience]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.signing_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!(error = %e, "access token rejected");
        AuthError::InvalidToken
    })
}
