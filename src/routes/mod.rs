pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Mounts every route. Each protected scope or resource carries its own `AuthMiddleware`;
/// `/register`, `/login`, `/refresh` and `/health` do not.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(
            web::resource("/register")
                .app_data(bad_request_json())
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/login")
                .app_data(bad_request_json())
                .route(web::post().to(auth::login)),
        )
        .service(web::resource("/refresh").route(web::post().to(auth::refresh)))
        .service(
            web::resource("/logout")
                .wrap(AuthMiddleware::access())
                .route(web::post().to(auth::logout)),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::access())
                .app_data(incomplete_json())
                .app_data(invalid_query())
                .app_data(unknown_path())
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware::access())
                .app_data(incomplete_json())
                .app_data(invalid_query())
                .app_data(unknown_path())
                .service(users::get_users)
                .service(users::create_user)
                .service(users::get_user_tasks)
                .service(users::get_user)
                .service(users::update_user)
                .service(users::delete_user),
        );
}

/// Registration and login bodies that fail to decode are a 400.
fn bad_request_json() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("Invalid request body: {}", err)).into())
}

/// Resource bodies that fail to decode are reported as incomplete data (422).
fn incomplete_json() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|_err, _req| AppError::ValidationError("incomplete data".into()).into())
}

fn invalid_query() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|_err, _req| AppError::BadRequest("invalid parameter".into()).into())
}

/// A non-numeric id can never match a row.
fn unknown_path() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::NotFound("Record not found".into()).into())
}
