use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, Result};

/// Serializes `value` with `sonic_rs` into a JSON response.
pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Response> {
    let body = sonic_rs::to_string(value)
        .map_err(|e| AppError::Internal(format!("Response serialization failed: {}", e)))?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// `204 No Content` with an empty body.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// `200` with the items, or `204` when there are none.
pub fn list<T: Serialize>(items: &[T]) -> Result<Response> {
    if items.is_empty() {
        return Ok(no_content());
    }
    json(StatusCode::OK, &items)
}
