use crate::{
    auth::{assert_owner, AuthenticatedUser},
    error::AppError,
    models::{ListQuery, Task, TaskInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, user_id, created_at, updated_at";

/// Lists tasks, oldest first, up to `limit` (default 10, at most 100).
///
/// ## Responses:
/// - `200 OK`: `{success, data: [Task]}`.
/// - `400 Bad Request`: `limit` is not an integer in range.
/// - `401 Unauthorized`: missing, invalid, expired or revoked access token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    query
        .validate()
        .map_err(|_| AppError::BadRequest("invalid parameter".into()))?;

    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks ORDER BY id LIMIT ?",
        TASK_COLUMNS
    ))
    .bind(query.limit())
    .fetch_all(&state.pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": tasks })))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: `{success, data: Task}`.
/// - `422 Unprocessable Entity`: no task with this id.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = ?",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("task not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": task })))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: `{success, data: Task}`.
/// - `422 Unprocessable Entity`: title or description missing or empty.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (title, description, user_id) VALUES (?, ?, ?) RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(user.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": task })))
}

/// Replaces title and description of a task the caller owns.
///
/// Lookup, ownership check and update run in one transaction, so nothing is written
/// when the check fails.
///
/// ## Responses:
/// - `200 OK`: `{success, message}`.
/// - `403 Forbidden`: the task belongs to someone else.
/// - `422 Unprocessable Entity`: no such task, or incomplete payload.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let mut write = state.begin_write().await?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = ?",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .fetch_optional(&mut *write.tx)
    .await?;
    assert_owner(task, user.id)?;
    task_data.validate()?;

    sqlx::query("UPDATE tasks SET title = ?, description = ?, updated_at = ? WHERE id = ?")
        .bind(&task_data.title)
        .bind(&task_data.description)
        .bind(Utc::now())
        .bind(task_id)
        .execute(&mut *write.tx)
        .await?;
    write.tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "task update successfully",
    })))
}

/// Deletes a task the caller owns.
///
/// ## Responses:
/// - `200 OK`: `{success, message}`.
/// - `403 Forbidden`: the task belongs to someone else.
/// - `422 Unprocessable Entity`: no such task.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let mut write = state.begin_write().await?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = ?",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .fetch_optional(&mut *write.tx)
    .await?;
    assert_owner(task, user.id)?;

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(&mut *write.tx)
        .await?;
    write.tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "data delete successfully",
    })))
}
