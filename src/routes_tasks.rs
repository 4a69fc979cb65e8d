// --------------------------------------------------
// Handles API endpoints related to task CRUD operations
// and the filtered task view.
//
// Responsibilities:
// - List the caller's tasks through the view-model
// - Create / update / delete tasks
// - Toggle or set the done flag
// -------------------------------------------------

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::require_session;
use crate::clock::{now_fixed_offset, today_local};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query};
use crate::logic::{self, DateFilter, FilterState, TaskStats};
use crate::models::{Priority, Task, TaskDraft};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub date: Option<String>, // "YYYY-MM-DD", defaults to the server's local date
    #[serde(default)]
    pub filter: DateFilter,
    #[serde(default)]
    pub search_title: String,
    #[serde(default)]
    pub search_subject: String,
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub date: NaiveDate,
    pub filter: DateFilter,
    pub tasks: Vec<Task>,
    pub stats: TaskStats,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("invalid id".to_string()))
}

// -----------------------------
// GET /api/tasks
// Returns the caller's tasks filtered, searched and sorted,
// plus statistics over all of them
// -----------------------------
pub async fn get_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<TasksQuery>, QueryRejection>,
) -> Result<Json<TasksResponse>, AppError> {
    let session = require_session(&state, &headers)?;
    let q = extract_query(query)?;
    let today = match q.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today_local(),
    };

    let tasks = state.store.list_tasks_for_user(session.user.id)?;
    let filter = FilterState {
        date_filter: q.filter,
        search_title: q.search_title,
        search_subject: q.search_subject,
    };
    let view = logic::compute_view(&tasks, &filter, today);

    Ok(Json(TasksResponse {
        date: today,
        filter: filter.date_filter,
        tasks: view.display,
        stats: view.stats,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TaskInput {
    pub subject: String,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>, // "YYYY-MM-DD" or "" for none
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TaskInput {
    pub fn into_draft(self) -> Result<TaskDraft, AppError> {
        let subject = self.subject.trim().to_string();
        if subject.is_empty() {
            return Err(AppError::Validation("subject required".to_string()));
        }
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title required".to_string()));
        }

        let due_date = match self.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date(raw)?),
        };
        let notes = self.notes.filter(|n| !n.trim().is_empty());

        Ok(TaskDraft {
            subject,
            title,
            due_date,
            priority: self.priority,
            notes,
        })
    }
}

// -----------------------------
// POST /api/tasks
// Creates a new task owned by the caller
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<TaskInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let session = require_session(&state, &headers)?;
    let draft = extract_json(body)?.into_draft()?;
    let task = state
        .store
        .create_task(session.user.id, draft, now_fixed_offset())?;
    Ok((StatusCode::CREATED, Json(task)))
}

// -----------------------------
// PUT /api/tasks/:id
// Updates an existing task by ID
// -----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<TaskInput>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let session = require_session(&state, &headers)?;
    let id = parse_id(&id)?;
    let draft = extract_json(body)?.into_draft()?;
    let task = state
        .store
        .update_task(session.user.id, id, draft, now_fixed_offset())?;
    Ok(Json(task))
}

// -----------------------------
// DELETE /api/tasks/:id
// Removes a task permanently
// -----------------------------
pub async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = require_session(&state, &headers)?;
    let id = parse_id(&id)?;
    state.store.delete_task(session.user.id, id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// POST /api/tasks/:id/toggle
// Flips the done flag
// -----------------------------
pub async fn toggle_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let session = require_session(&state, &headers)?;
    let id = parse_id(&id)?;
    let task = state
        .store
        .toggle_done(session.user.id, id, now_fixed_offset())?;
    Ok(Json(task))
}

#[derive(Debug, Deserialize)]
pub struct DoneInput {
    pub done: bool,
}

// -----------------------------
// PUT /api/tasks/:id/done
// Sets the done flag explicitly
// -----------------------------
pub async fn set_done(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<DoneInput>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let session = require_session(&state, &headers)?;
    let id = parse_id(&id)?;
    let input = extract_json(body)?;
    let task = state
        .store
        .set_done(session.user.id, id, input.done, now_fixed_offset())?;
    Ok(Json(task))
}
