/// Error types for the credential lifecycle
///
/// User-facing failures are deliberately coarse: login failures never say
/// whether the account exists, refresh failures never say whether the token
/// was unknown, expired, or revoked, and registration conflicts never say
/// which field collided. Only configuration errors are fatal, and only at
/// construction time.

use std::error::Error as StdError;
use std::fmt;

/// Persistence collaborator errors
#[derive(Debug, Clone)]
pub enum StoreError {
    /// A unique constraint (username, email, or token value) was violated.
    UniqueViolation(String),
    /// Any other backend failure (connection, query, serialization).
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UniqueViolation(msg) => write!(f, "duplicate entry: {}", msg),
            StoreError::Backend(msg) => write!(f, "store error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

/// Configuration errors, surfaced at construction time and never per-call
#[derive(Debug, Clone)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(field) => {
                write!(f, "missing required configuration: {}", field)
            }
            ConfigError::InvalidValue(msg) => write!(f, "invalid configuration value: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Central error type returned by every credential operation
#[derive(Debug)]
pub enum AuthError {
    /// Registration collides with an existing username or email.
    /// The colliding field is intentionally not disclosed.
    Conflict,
    /// Login credentials do not resolve to a valid user/password pair.
    /// Identical wording whether the account exists or not.
    InvalidCredentials,
    /// Refresh token absent, expired, revoked, or lost a rotation race.
    /// Identical wording across all causes.
    InvalidToken,
    /// Access-token signing failed.
    TokenGeneration(String),
    Store(StoreError),
    Config(ConfigError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Conflict => write!(f, "user already exists"),
            AuthError::InvalidCredentials => write!(f, "invalid username or password"),
            AuthError::InvalidToken => write!(f, "invalid refresh token"),
            AuthError::TokenGeneration(msg) => write!(f, "token generation failed: {}", msg),
            AuthError::Store(e) => write!(f, "{}", e),
            AuthError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl StdError for AuthError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AuthError::Store(e) => Some(e),
            AuthError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err)
    }
}

impl From<ConfigError> for AuthError {
    fn from(err: ConfigError) -> Self {
        AuthError::Config(err)
    }
}
