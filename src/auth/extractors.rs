use actix_web::dev::Payload;
use actix_web::{http::header, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::{AppError, AuthError};

/// The identity admitted by `AuthMiddleware`, read back from request extensions.
///
/// Extraction fails with 401 when the middleware did not run or rejected the request;
/// handlers never see an anonymous caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub claims: Claims,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(AppError::Auth(AuthError::MissingToken).into())),
        }
    }
}

/// The raw token from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn from_header(req: &HttpRequest) -> Option<Self> {
        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| BearerToken(token.trim().to_string()))
    }
}

impl FromRequest for BearerToken {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_header(req).ok_or_else(|| AppError::Auth(AuthError::MissingToken).into()))
    }
}
