use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};

/// Validates a consumption record body.
///
/// # Arguments
///
/// * `consumed_at` - The `data` field; absent or the zero instant counts as missing.
/// * `amount` - The `quantidade` field in millilitres.
///
/// # Returns
///
/// The checked `(consumed_at, amount)` pair.
pub fn validate_intake(
    consumed_at: Option<DateTime<Utc>>,
    amount: Option<i32>,
) -> Result<(DateTime<Utc>, i32)> {
    let consumed_at = consumed_at
        .filter(|instant| !is_zero_instant(instant))
        .ok_or_else(|| AppError::Validation("data of the consumption is missing".to_string()))?;

    let amount = amount.unwrap_or(0);
    if amount <= 0 {
        return Err(AppError::Validation(
            "quantidade must be greater than zero".to_string(),
        ));
    }

    Ok((consumed_at, amount))
}

/// `0001-01-01T00:00:00Z`, what clients send for an unset timestamp.
fn is_zero_instant(instant: &DateTime<Utc>) -> bool {
    *instant == DateTime::<Utc>::from_timestamp(-62_135_596_800, 0).unwrap_or_default()
}

/// Parses the RFC 3339 `{timestamp}` path segment.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| AppError::Validation(format!("invalid timestamp '{}': {}", value, e)))
}
