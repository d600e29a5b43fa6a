use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::{AuthenticatedUser, BearerToken};
use crate::auth::token::TokenKind;
use crate::error::{AppError, AuthError};
use crate::state::AppState;

/// Guards a scope or resource: every request must carry a bearer token of the given kind
/// that `AuthVerifier::authenticate` accepts. On success the caller's `AuthenticatedUser`
/// is placed in request extensions; otherwise the request is answered with the error and
/// the wrapped service never runs.
#[derive(Clone, Copy)]
pub struct AuthMiddleware {
    required: TokenKind,
}

impl AuthMiddleware {
    pub fn access() -> Self {
        Self {
            required: TokenKind::Access,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    required: TokenKind,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required;

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| AppError::InternalServerError("AppState not configured".into()))?;

            let token = BearerToken::from_header(req.request())
                .ok_or(AppError::Auth(AuthError::MissingToken))?;

            let claims = match state.verifier.authenticate(&token.0, required).await {
                Ok(claims) => claims,
                Err(err) => {
                    log::debug!("rejected {} {}: {}", req.method(), req.path(), err);
                    return Err(err.into());
                }
            };

            req.extensions_mut().insert(AuthenticatedUser {
                id: claims.sub,
                claims,
            });
            service.call(req).await
        })
    }
}
