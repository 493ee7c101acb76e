// --------------------------------------------------
// Handles API endpoints related to task CRUD operations
// and applying a unit of work to a task.
//
// Responsibilities:
// - List tasks (after the missed sweep)
// - Create / edit / delete tasks
// - Advance a task's state after work was done
// -------------------------------------------------

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::app::{AppState, now_fixed_offset, owner_id};
use crate::error::{Error, Result};
use crate::models::{DEFAULT_SCALAR, SCALE_MAX, Task, TaskEdit, TaskStatus};

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub now: String,
    pub tasks: Vec<Task>,
}

// Accepts "YYYY-MM-DD" as well as a full timestamp; only the date part counts.
pub fn parse_deadline(raw: &str) -> Result<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw).trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| Error::BadRequest("invalid deadline".to_string()))
}

fn check_scalar(name: &str, value: i64) -> Result<i64> {
    if (0..=SCALE_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(Error::BadRequest(format!("{name} must be 0..={SCALE_MAX}")))
    }
}

fn check_estimate(value: i64) -> Result<i64> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(Error::BadRequest("estimated_days must be >= 1".to_string()))
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| Error::BadRequest("invalid id".to_string()))
}

// -----------------------------
// GET /api/tasks
// Returns the owner's tasks; overdue pending ones are flagged missed first
// -----------------------------
pub async fn get_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TasksResponse>> {
    let owner = owner_id(&headers)?;
    let now = now_fixed_offset();

    let tasks = state.store.list_tasks_swept(owner, now)?;

    Ok(Json(TasksResponse {
        now: now.to_rfc3339(),
        tasks,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<String>, // "YYYY-MM-DD"
    pub importance: Option<i64>,
    pub effort: Option<i64>,
    pub difficulty: Option<i64>,
    pub consequences: Option<i64>,
    pub estimated_days: Option<i64>,
}

// -----------------------------
// POST /api/tasks
// Creates a pending task with all of its work remaining
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>)> {
    let owner = owner_id(&headers)?;

    if input.title.trim().is_empty() {
        return Err(Error::BadRequest("title required".to_string()));
    }
    let deadline = input.deadline.as_deref().map(parse_deadline).transpose()?;
    let estimated_days = check_estimate(input.estimated_days.unwrap_or(1))?;

    let task = Task {
        id: Uuid::new_v4(),
        owner_id: owner,
        title: input.title,
        description: input.description,
        deadline,
        estimated_days,
        remaining_days: Some(estimated_days as f64),
        importance: check_scalar("importance", input.importance.unwrap_or(DEFAULT_SCALAR))?,
        effort: check_scalar("effort", input.effort.unwrap_or(DEFAULT_SCALAR))?,
        difficulty: check_scalar("difficulty", input.difficulty.unwrap_or(DEFAULT_SCALAR))?,
        consequences: check_scalar("consequences", input.consequences.unwrap_or(DEFAULT_SCALAR))?,
        status: TaskStatus::Pending,
        last_scheduled_at: None,
        completed_at: None,
        created_at: now_fixed_offset(),
    };

    let created = state.store.create_task(task)?;
    info!(task_id = %created.id, %owner, "created task");

    Ok((StatusCode::CREATED, Json(created)))
}

// Missing field -> None, explicit null -> Some(None), value -> Some(Some(v))
fn nullable<'de, T, D>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub deadline: Option<Option<String>>, // null clears the deadline
    pub importance: Option<i64>,
    pub effort: Option<i64>,
    pub difficulty: Option<i64>,
    pub consequences: Option<i64>,
    pub estimated_days: Option<i64>,
}

impl UpdateTaskInput {
    fn into_edit(self) -> Result<TaskEdit> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::BadRequest("title required".to_string()));
            }
        }
        Ok(TaskEdit {
            title: self.title,
            description: self.description,
            deadline: match self.deadline {
                Some(Some(raw)) => Some(Some(parse_deadline(&raw)?)),
                Some(None) => Some(None),
                None => None,
            },
            estimated_days: self.estimated_days.map(check_estimate).transpose()?,
            importance: self.importance.map(|v| check_scalar("importance", v)).transpose()?,
            effort: self.effort.map(|v| check_scalar("effort", v)).transpose()?,
            difficulty: self.difficulty.map(|v| check_scalar("difficulty", v)).transpose()?,
            consequences: self
                .consequences
                .map(|v| check_scalar("consequences", v))
                .transpose()?,
        })
    }
}

// -----------------------------
// PUT /api/tasks/:id
// Edits descriptive fields; a new estimate rescales the remaining work
// ----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<Task>> {
    let owner = owner_id(&headers)?;
    let id = parse_id(&id)?;
    let edit = input.into_edit()?;

    let updated = state.store.edit_task(id, owner, edit)?.ok_or(Error::NotFound)?;
    Ok(Json(updated))
}

// -----------------------------
// DELETE /api/tasks/:id
// Removes a task permanently
// -----------------------------
pub async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let owner = owner_id(&headers)?;
    let id = parse_id(&id)?;

    if !state.store.delete_task(id, owner)? {
        return Err(Error::NotFound);
    }
    info!(task_id = %id, %owner, "deleted task");

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressInput {
    // Units of work done; defaults to one unit when absent
    pub allocated: Option<f64>,
}

// -----------------------------
// POST /api/tasks/:id/progress
// Applies a unit of work and persists the resulting state
// -----------------------------
pub async fn progress_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ProgressInput>,
) -> Result<Json<Task>> {
    let owner = owner_id(&headers)?;
    let id = parse_id(&id)?;

    if let Some(allocated) = input.allocated {
        if !allocated.is_finite() || allocated < 0.0 {
            return Err(Error::BadRequest("allocated must be a non-negative number".to_string()));
        }
    }

    let updated = state
        .store
        .advance_task(id, owner, input.allocated, now_fixed_offset())?
        .ok_or(Error::NotFound)?;
    info!(
        task_id = %id,
        status = ?updated.status,
        remaining = updated.remaining_work(),
        "recorded progress"
    );

    Ok(Json(updated))
}
