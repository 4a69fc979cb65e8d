// --------------------------------------------------
// Handles API endpoints related to sessions.
//
// Responsibilities:
// - Sign up / sign in (returns a bearer token)
// - Sign out
// - Report the current session and profile
// -------------------------------------------------

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::auth::{self, Session};
use crate::clock::now_fixed_offset;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::models::Profile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsInput {
    pub email: String,
    pub password: String,
}

// -----------------------------
// POST /api/auth/signup
// -----------------------------
pub async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<CredentialsInput>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let input = extract_json(body)?;
    let session = auth::sign_up(
        &state.store,
        &state.sessions,
        &input.email,
        &input.password,
        now_fixed_offset(),
    )?;
    Ok(Json(session))
}

// -----------------------------
// POST /api/auth/signin
// -----------------------------
pub async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<CredentialsInput>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let input = extract_json(body)?;
    let session = auth::sign_in(
        &state.store,
        &state.sessions,
        &input.email,
        &input.password,
        now_fixed_offset(),
    )?;
    Ok(Json(session))
}

// -----------------------------
// POST /api/auth/signout
// -----------------------------
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = auth::require_session(&state, &headers)?;
    auth::sign_out(&state.sessions, &session.token);
    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// GET /api/auth/session
// -----------------------------
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Session>, AppError> {
    Ok(Json(auth::require_session(&state, &headers)?))
}

// -----------------------------
// GET /api/profile
// -----------------------------
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Profile>, AppError> {
    let session = auth::require_session(&state, &headers)?;
    let profile = state
        .store
        .profile(session.user.id)?
        .ok_or_else(|| AppError::NotFound("profile".to_string()))?;
    Ok(Json(profile))
}
