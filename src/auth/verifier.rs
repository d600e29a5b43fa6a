use crate::auth::credentials::CredentialStore;
use crate::auth::revocation::RevocationLedger;
use crate::auth::token::{Claims, IssuedToken, TokenIssuer, TokenKind};
use crate::error::{AppError, AuthError};

/// Admits or rejects bearer tokens: signature and expiry through the issuer, then the
/// expected kind, then the revocation ledger, then the identity the token names.
#[derive(Clone)]
pub struct AuthVerifier {
    issuer: TokenIssuer,
    ledger: RevocationLedger,
    credentials: CredentialStore,
}

impl AuthVerifier {
    pub fn new(issuer: TokenIssuer, ledger: RevocationLedger, credentials: CredentialStore) -> Self {
        Self {
            issuer,
            ledger,
            credentials,
        }
    }

    /// Returns the claims of `raw_token` if it is well-formed, unexpired, of kind
    /// `required`, not revoked and still names an existing identity. There is no
    /// anonymous fallback.
    pub async fn authenticate(&self, raw_token: &str, required: TokenKind) -> Result<Claims, AppError> {
        let claims = self.issuer.decode(raw_token)?;

        if claims.kind != required {
            return Err(AuthError::WrongTokenKind.into());
        }
        if self.ledger.is_revoked(&claims.jti).await? {
            return Err(AuthError::RevokedToken.into());
        }
        if !self.credentials.exists(claims.sub).await? {
            return Err(AuthError::UnknownSubject.into());
        }

        Ok(claims)
    }

    /// Mints a new access token from a valid refresh token. The refresh token itself is
    /// neither rotated nor revoked.
    pub async fn renew_access(&self, refresh_token: &str) -> Result<IssuedToken, AppError> {
        let claims = self.authenticate(refresh_token, TokenKind::Refresh).await?;
        self.issuer.issue_access(claims.sub)
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn ledger(&self) -> &RevocationLedger {
        &self.ledger
    }
}
