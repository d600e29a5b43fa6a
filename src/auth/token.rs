use crate::error::{AppError, AuthError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the two credentials a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, authorizes ordinary API calls.
    Access,
    /// Long-lived, only accepted by `/refresh`.
    Refresh,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: i64,
    pub kind: TokenKind,
    /// Unique token id, the key used by the revocation ledger.
    pub jti: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and decodes access and refresh tokens with a process-wide HS256 secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issues an access token for `user_id`, valid for the configured access lifetime.
    pub fn issue_access(&self, user_id: i64) -> Result<IssuedToken, AppError> {
        self.issue(user_id, TokenKind::Access, Utc::now(), self.access_ttl)
    }

    /// Issues a refresh token for `user_id`, valid for the configured refresh lifetime.
    pub fn issue_refresh(&self, user_id: i64) -> Result<IssuedToken, AppError> {
        self.issue(user_id, TokenKind::Refresh, Utc::now(), self.refresh_ttl)
    }

    /// Signs a token with an explicit issue time. `issue_access`/`issue_refresh` call this
    /// with the current time; tests use it to mint already-expired tokens.
    pub fn issue(
        &self,
        user_id: i64,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        let claims = Claims {
            sub: user_id,
            kind,
            jti: Uuid::new_v4().to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verifies the signature and expiry of `token` and returns its claims.
    ///
    /// Expiry is checked with zero leeway. Any failure other than expiry, including a bad
    /// signature, is reported as `MalformedToken`. Revocation is not consulted here.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::MalformedToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret, Duration::minutes(15), Duration::days(30))
    }

    #[test]
    fn test_token_generation_and_verification() {
        let issuer = issuer("test_secret_for_gen_verify");
        let issued = issuer.issue_access(1).unwrap();
        let claims = issuer.decode(&issued.token).unwrap();

        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let issuer = issuer("test_secret_for_refresh");
        let issued = issuer.issue_refresh(9).unwrap();

        assert_eq!(issued.claims.kind, TokenKind::Refresh);
        assert_eq!(issued.claims.exp - issued.claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let issuer = issuer("test_secret_for_jti");
        let first = issuer.issue_access(1).unwrap();
        let second = issuer.issue_access(1).unwrap();
        assert_ne!(first.claims.jti, second.claims.jti);
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_token_expiration() {
        let issuer = issuer("test_secret_for_expiration");
        let expired = issuer
            .issue(
                2,
                TokenKind::Access,
                Utc::now() - Duration::hours(2),
                Duration::minutes(15),
            )
            .unwrap();

        assert_eq!(issuer.decode(&expired.token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = issuer("one_secret").issue_access(3).unwrap().token;
        assert_eq!(
            issuer("a_completely_different_secret").decode(&token),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn test_garbage_token() {
        let issuer = issuer("test_secret");
        assert_eq!(issuer.decode("not-a-jwt"), Err(AuthError::MalformedToken));
        assert_eq!(issuer.decode(""), Err(AuthError::MalformedToken));
    }
}
