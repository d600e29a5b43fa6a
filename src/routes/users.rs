use crate::{
    auth::{assert_owner, AuthenticatedUser},
    error::AppError,
    models::{ListQuery, Task, User, UserInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

const USER_COLUMNS: &str = "id, name, email, created_at";

/// Lists users, oldest first, up to `limit`.
#[get("")]
pub async fn get_users(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    query
        .validate()
        .map_err(|_| AppError::BadRequest("invalid parameter".into()))?;

    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY id LIMIT ?",
        USER_COLUMNS
    ))
    .bind(query.limit())
    .fetch_all(&state.pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": users })))
}

#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(user_id.into_inner())
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": user })))
}

/// Creates an account on behalf of an authenticated caller. Same storage rules as
/// `/register`: the password is hashed, duplicates are rejected with 422.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    user_data: web::Json<UserInput>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;

    let user = state
        .credentials
        .register(&user_data.name, &user_data.email, &user_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": user })))
}

/// Replaces name, email and password of the caller's own account.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    user_data: web::Json<UserInput>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    let mut write = state.begin_write().await?;

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(&mut *write.tx)
    .await?;
    assert_owner(user, caller.id)?;
    user_data.validate()?;

    state
        .credentials
        .update(
            &mut write.tx,
            user_id,
            &user_data.name,
            &user_data.email,
            &user_data.password,
        )
        .await?;
    write.tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "user update successfully",
    })))
}

/// Deletes the caller's own account, refusing while it still owns tasks.
/// The access token used for the request is revoked afterwards.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    let mut write = state.begin_write().await?;

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(&mut *write.tx)
    .await?;
    assert_owner(user, caller.id)?;

    let (owned,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&mut *write.tx)
        .await?;
    if owned > 0 {
        return Err(AppError::ValidationError("user still owns tasks".into()));
    }

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *write.tx)
        .await?;
    write.tx.commit().await?;

    state
        .ledger()
        .revoke(&caller.claims.jti, caller.claims.expires_at())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "user delete successfully",
    })))
}

/// Lists the tasks owned by a user. An empty result is reported as 422 "tasks not found".
#[get("/{id}/tasks")]
pub async fn get_user_tasks(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    query: web::Query<ListQuery>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    query
        .validate()
        .map_err(|_| AppError::BadRequest("invalid parameter".into()))?;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, user_id, created_at, updated_at FROM tasks
         WHERE user_id = ? ORDER BY id LIMIT ?",
    )
    .bind(user_id.into_inner())
    .bind(query.limit())
    .fetch_all(&state.pool)
    .await?;

    if tasks.is_empty() {
        return Err(AppError::NotFound("tasks not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": tasks })))
}
