use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    calendar,
    error::{AppError, Result},
    extract::JsonBody,
    models::{session::AuthenticatedUser, water::WaterIntake},
    response,
    services::water as water_service,
    state::AppState,
    validation::water::{parse_timestamp, validate_intake},
};

/// The request payload for creating or replacing a consumption record.
#[derive(Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub data: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quantidade: Option<i32>,
}

/// Records a water intake for the logged-in user.
#[axum::debug_handler]
pub async fn create_intake(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(payload): JsonBody<IntakeRequest>,
) -> Result<Response> {
    let (consumed_at, amount) = validate_intake(payload.data, payload.quantidade)?;

    let intake = water_service::create_intake(
        &state,
        WaterIntake {
            user_id: user.user_id,
            consumed_at,
            amount,
        },
    )
    .await?;

    response::json(StatusCode::CREATED, &intake)
}

#[axum::debug_handler]
pub async fn get_intake(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(timestamp): Path<String>,
) -> Result<Response> {
    let consumed_at = parse_timestamp(&timestamp)?;
    let intake = water_service::find_intake(&state, user.user_id, consumed_at).await?;
    response::json(StatusCode::OK, &intake)
}

#[axum::debug_handler]
pub async fn update_intake(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(timestamp): Path<String>,
    JsonBody(payload): JsonBody<IntakeRequest>,
) -> Result<Response> {
    let consumed_at = parse_timestamp(&timestamp)?;
    let (new_consumed_at, amount) = validate_intake(payload.data, payload.quantidade)?;

    water_service::update_intake(&state, user.user_id, consumed_at, new_consumed_at, amount)
        .await?;
    Ok(response::no_content())
}

#[axum::debug_handler]
pub async fn delete_intake(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(timestamp): Path<String>,
) -> Result<Response> {
    let consumed_at = parse_timestamp(&timestamp)?;
    water_service::delete_intake(&state, user.user_id, consumed_at).await?;
    Ok(response::no_content())
}

/// Lists the records of one day (`yyyy-mm-dd`).
#[axum::debug_handler]
pub async fn intakes_of_day(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(day): Path<String>,
) -> Result<Response> {
    let day = calendar::parse_day(&day).ok_or_else(|| {
        AppError::Validation(format!("invalid day '{}', expected format: yyyy-mm-dd", day))
    })?;

    let intakes = water_service::intakes_of_day(&state, user.user_id, day).await?;
    response::list(&intakes)
}

/// Lists the records of one month (`yyyy-mm`).
#[axum::debug_handler]
pub async fn intakes_of_month(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(month): Path<String>,
) -> Result<Response> {
    let first_day = calendar::parse_month(&month).ok_or_else(|| {
        AppError::Validation(format!("invalid month '{}', expected format: yyyy-mm", month))
    })?;

    let intakes = water_service::intakes_of_month(&state, user.user_id, first_day).await?;
    response::list(&intakes)
}

/// Lists the records of one week of a year.
#[axum::debug_handler]
pub async fn intakes_of_week(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((year, week)): Path<(String, String)>,
) -> Result<Response> {
    let year: i32 = year
        .parse()
        .map_err(|_| AppError::Validation(format!("invalid year '{}'", year)))?;
    let week: i32 = week
        .parse()
        .map_err(|_| AppError::Validation(format!("invalid week '{}'", week)))?;

    let intakes = water_service::intakes_of_week(&state, user.user_id, year, week).await?;
    response::list(&intakes)
}
