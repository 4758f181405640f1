//! mini-identity: credential and session lifecycle for a host application.
//!
//! Hashes and verifies passwords (PBKDF2-HMAC-SHA256), mints short-lived
//! signed access tokens, and manages long-lived refresh tokens with
//! rotation, revocation, and lazy reclamation. Owns no transport and no
//! storage engine: hosts supply implementations of the [`store`] traits
//! (or use [`memory::InMemoryIdentityStore`]) and compose a
//! [`CredentialManager`] explicitly at startup.

pub mod auth;
pub mod configuration;
pub mod error;
pub mod manager;
pub mod memory;
pub mod models;
pub mod store;
pub mod telemetry;

pub use auth::{AccessTokenIssuer, Claims, RefreshTokenStore};
pub use configuration::{get_configuration, IdentitySettings};
pub use error::{AuthError, ConfigError, StoreError};
pub use manager::{CredentialManager, TokenPair};
pub use memory::InMemoryIdentityStore;
pub use models::{RefreshTokenRecord, User};
pub use store::{RefreshTokenPersistence, UserStore};
