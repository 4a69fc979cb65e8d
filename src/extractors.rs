// --------------------------------------------------
// Request body / query extraction helpers.
//
// Handlers take `Result<Json<T>, JsonRejection>` (or the Query
// equivalent) and pass it through here, so malformed input is
// reported with the same JSON error body as every other failure.
// --------------------------------------------------

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

use crate::error::AppError;

// Serde data errors (unknown priority, wrong types) -> 422,
// anything else (syntax, content type) -> 400
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result.map(|Json(v)| v).map_err(|err| match err {
        JsonRejection::JsonDataError(_) => AppError::Validation(err.body_text()),
        _ => AppError::BadRequest(err.body_text()),
    })
}

pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}
