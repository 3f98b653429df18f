/// Task endpoints
///
/// All routes act on the authenticated caller's tasks.
///
/// - `GET /v1/tasks` - pending tasks, earliest deadline first
/// - `POST /v1/tasks` - create a task
/// - `DELETE /v1/tasks/:id` - delete one of the caller's pending tasks

use crate::{
    app::{AppState, AuthContext},
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tasktracker_shared::deadline::format_deadline;
use tasktracker_shared::models::Task;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,

    /// `D.M.YYYY HH:MM`
    #[validate(length(min = 1, message = "deadline is required"))]
    pub deadline: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub deadline: DateTime<Utc>,

    /// The deadline as the bot shows it
    pub deadline_display: String,

    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            deadline_display: format_deadline(task.deadline),
            title: task.title,
            deadline: task.deadline,
            created_at: task.created_at,
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state.tasks.list_tasks(auth.user_id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// # Response
///
/// `201 Created` with `{"status": "created"}`
///
/// # Errors
///
/// - `422 Unprocessable Entity`: empty title, malformed or past deadline
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate()?;

    state
        .tasks
        .create_task(auth.user_id, &req.title, req.deadline.trim())
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "created" }))))
}

/// # Errors
///
/// - `404 Not Found`: no pending task with this id belongs to the caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let owned = state
        .tasks
        .list_tasks(auth.user_id)
        .await?
        .iter()
        .any(|t| t.id == task_id);
    if !owned {
        return Err(ApiError::NotFound(format!("Task {} not found", task_id)));
    }

    state.tasks.delete_task(task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
