use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    calendar::{self, Range},
    error::{AppError, Result},
    models::water::WaterIntake,
    state::AppState,
};

pub async fn create_intake(state: &AppState, intake: WaterIntake) -> Result<WaterIntake> {
    state.water.create_intake(&intake).await?;
    tracing::debug!("💧 Intake recorded for user {} at {}", intake.user_id, intake.consumed_at);
    Ok(intake)
}

/// Fetches one record.
///
/// A missing record is reported as `NotFound`, which maps to a server error.
pub async fn find_intake(
    state: &AppState,
    user_id: i32,
    consumed_at: DateTime<Utc>,
) -> Result<WaterIntake> {
    state
        .water
        .find_intake(user_id, consumed_at)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("no water consumption found at this timestamp".to_string())
        })
}

pub async fn update_intake(
    state: &AppState,
    user_id: i32,
    consumed_at: DateTime<Utc>,
    new_consumed_at: DateTime<Utc>,
    amount: i32,
) -> Result<()> {
    state
        .water
        .update_intake(user_id, consumed_at, new_consumed_at, amount)
        .await
}

pub async fn delete_intake(state: &AppState, user_id: i32, consumed_at: DateTime<Utc>) -> Result<()> {
    state.water.delete_intake(user_id, consumed_at).await
}

/// Records of the calendar day `day` (UTC).
pub async fn intakes_of_day(state: &AppState, user_id: i32, day: NaiveDate) -> Result<Vec<WaterIntake>> {
    let range = calendar::day_range(day)
        .ok_or_else(|| AppError::Validation(format!("day {} is out of range", day)))?;
    list(state, user_id, range).await
}

/// Records of the month starting at `first_day` (UTC).
pub async fn intakes_of_month(
    state: &AppState,
    user_id: i32,
    first_day: NaiveDate,
) -> Result<Vec<WaterIntake>> {
    let range = calendar::month_range(first_day)
        .ok_or_else(|| AppError::Validation(format!("month {} is out of range", first_day)))?;
    list(state, user_id, range).await
}

/// Records of `week` of `year`, weeks starting on the first Monday of the year.
pub async fn intakes_of_week(
    state: &AppState,
    user_id: i32,
    year: i32,
    week: i32,
) -> Result<Vec<WaterIntake>> {
    let range = calendar::week_range(year, week).map_err(|e| AppError::Validation(e.to_string()))?;
    list(state, user_id, range).await
}

async fn list(state: &AppState, user_id: i32, range: Range) -> Result<Vec<WaterIntake>> {
    state.water.list_intakes(user_id, range).await
}
