/// Authentication primitives
///
/// Password hashing, access token issuance, and refresh token lifecycle.

mod claims;
mod password;
mod refresh_token;
mod token;

pub use claims::Claims;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::RefreshTokenStore;
pub use token::decode_access_token;
pub use token::AccessTokenIssuer;
