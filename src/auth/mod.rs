//! Authentication and authorization: credential storage, token issuance and verification,
//! the revocation ledger, the request guard middleware and resource ownership checks.

pub mod credentials;
pub mod extractors;
pub mod middleware;
pub mod ownership;
pub mod password;
pub mod revocation;
pub mod token;
pub mod verifier;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use credentials::CredentialStore;
pub use extractors::{AuthenticatedUser, BearerToken};
pub use middleware::AuthMiddleware;
pub use ownership::{assert_owner, Owned};
pub use password::{hash_password, verify_password};
pub use revocation::RevocationLedger;
pub use token::{Claims, IssuedToken, TokenIssuer, TokenKind};
pub use verifier::AuthVerifier;

lazy_static! {
    // Regex for name validation: alphanumeric, underscores, hyphens
    pub static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired name for the new account.
    /// Must be between 1 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 1, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Name must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub name: String,
    /// Email address for the new account.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. Only emptiness is rejected.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Body of a successful `/refresh`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}
