//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application,
//! together with `AuthError`, the family of authentication failures raised while issuing,
//! verifying and revoking tokens.
//!
//! `AppError` implements `actix_web::error::ResponseError` so every failure leaves a handler
//! as a JSON body of the form `{"error": "..."}` with the status code this service uses for it.
//! Persistence failures are logged and replaced by a generic message; raw driver errors never
//! reach the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Reasons a credential or bearer token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown name or wrong password. The two cases are deliberately indistinguishable.
    InvalidCredentials,
    /// No `Authorization: Bearer ...` header on a protected route.
    MissingToken,
    /// The token could not be parsed or its signature does not verify.
    MalformedToken,
    /// The token's `exp` is in the past.
    ExpiredToken,
    /// The token's `jti` is present in the revocation ledger.
    RevokedToken,
    /// An access token where a refresh token is required, or the reverse.
    WrongTokenKind,
    /// The token is sound but the identity it names has since been deleted.
    UnknownSubject,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            AuthError::InvalidCredentials => "Name or Password is invalid",
            AuthError::MissingToken => "Missing token",
            AuthError::MalformedToken => "Invalid token",
            AuthError::ExpiredToken => "Token has expired",
            AuthError::RevokedToken => "Token has been revoked",
            AuthError::WrongTokenKind => "Wrong token type",
            AuthError::UnknownSubject => "User no longer exists",
        };
        f.write_str(msg)
    }
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, often carrying a message
/// detailing the issue. These errors are then converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failure (HTTP 401, or 422 for bad login credentials).
    Auth(AuthError),
    /// Missing or malformed input on registration, login or query parameters (HTTP 400).
    BadRequest(String),
    /// Incomplete resource payload (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// A unique constraint rejected the write (HTTP 422).
    Duplicate(String),
    /// The caller is authenticated but does not own the resource (HTTP 403).
    Forbidden(String),
    /// The requested resource does not exist (HTTP 422, this service's convention).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from database operations (HTTP 500).
    /// The message is logged, never sent to the client.
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Auth(err) => write!(f, "Unauthorized: {}", err),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Duplicate(msg) => write!(f, "Duplicate: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        AppError::Auth(error)
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(err) => err.status(),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) | AppError::Duplicate(_) | AppError::NotFound(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Auth(err) => err.to_string(),
            AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::Duplicate(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}", msg);
                "Internal server error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Unique-constraint violations become `AppError::Duplicate`, a missing row or a dangling
/// foreign key becomes `AppError::NotFound`, everything else is an opaque
/// `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Duplicate("Record already exists".into())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("Referenced record not found".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}
