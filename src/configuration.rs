use config::ConfigError as ConfigLoadError;

use crate::error::ConfigError;

/// Identity settings
///
/// Immutable for the process lifetime once constructed. Every tunable the
/// components consume lives here as a named field with a documented default;
/// the signing key is the only field without one.
#[derive(serde::Deserialize, Clone)]
pub struct IdentitySettings {
    /// Symmetric signing key for access tokens. Treated as sensitive; the
    /// host is responsible for enforcing a minimum effective length.
    pub signing_key: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Access token lifetime in seconds (default: 1 hour).
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds (default: 7 days).
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
    /// PBKDF2 iteration count for newly created password hashes. Stored
    /// hashes embed their own count, so raising this never invalidates them.
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,
}

fn default_issuer() -> String {
    "mini-issuer".to_string()
}

fn default_audience() -> String {
    "mini-audience".to_string()
}

fn default_access_token_expiry() -> i64 {
    3_600
}

fn default_refresh_token_expiry() -> i64 {
    604_800
}

fn default_pbkdf2_iterations() -> u32 {
    100_000
}

impl IdentitySettings {
    /// Check the invariants the token issuer relies on. A failure here is a
    /// startup error, never a per-call condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_key.is_empty() {
            return Err(ConfigError::MissingRequired("signing_key".to_string()));
        }
        if self.issuer.is_empty() {
            return Err(ConfigError::MissingRequired("issuer".to_string()));
        }
        if self.audience.is_empty() {
            return Err(ConfigError::MissingRequired("audience".to_string()));
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "access_token_expiry must be positive".to_string(),
            ));
        }
        if self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "refresh_token_expiry must be positive".to_string(),
            ));
        }
        if self.pbkdf2_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "pbkdf2_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load settings from an optional `identity` configuration file.
pub fn get_configuration() -> Result<IdentitySettings, ConfigLoadError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("identity").required(false))
        .add_source(config::Environment::with_prefix("IDENTITY"))
        .build()?;
    settings.try_deserialize::<IdentitySettings>()
}
