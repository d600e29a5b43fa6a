use crate::{
    auth::{AccessTokenResponse, AuthenticatedUser, BearerToken, LoginRequest, RegisterRequest, TokenPair},
    error::{AppError, AuthError},
    state::AppState,
};
use actix_web::{web, HttpResponse};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Stores the identity with a bcrypt hash of its password. Responds 400 on missing or
/// malformed fields and 422 when the name or email is already taken.
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    register_data
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state
        .credentials
        .register(
            &register_data.name,
            &register_data.email,
            &register_data.password,
        )
        .await?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Registration user is completed",
        "data": user,
    })))
}

/// Login user
///
/// Checks the name/password pair and returns a fresh access and refresh token.
/// Unknown names and wrong passwords produce the same 422 response.
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    login_data
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state
        .credentials
        .verify(&login_data.name, &login_data.password)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    let access = state.issuer().issue_access(user.id)?;
    let refresh = state.issuer().issue_refresh(user.id)?;

    Ok(HttpResponse::Ok().json(TokenPair {
        message: "Login successful".into(),
        access_token: access.token,
        refresh_token: refresh.token,
    }))
}

/// Exchange a refresh token for a new access token
///
/// The refresh token travels in the `Authorization` header. Access tokens are refused.
pub async fn refresh(
    state: web::Data<AppState>,
    token: BearerToken,
) -> Result<HttpResponse, AppError> {
    let access = state.verifier.renew_access(&token.0).await?;
    Ok(HttpResponse::Ok().json(AccessTokenResponse {
        access_token: access.token,
    }))
}

/// Logout
///
/// Revokes the access token that authenticated this request.
pub async fn logout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state
        .ledger()
        .revoke(&user.claims.jti, user.claims.expires_at())
        .await?;
    log::info!("user {} logged out", user.id);

    Ok(HttpResponse::Ok().json(json!({ "message": "logout successfully" })))
}
