use chrono::NaiveDate;
use garde::Validate;

use crate::error::{AppError, Result};

/// Minimum length of names, nicknames and passwords.
pub const MIN_TEXT_LEN: usize = 2;
/// Exact length of a phone number (area code + number).
pub const PHONE_LEN: usize = 11;

/// Runs the `garde` rules of `payload`, reporting the first failure.
pub fn validate_payload<T>(payload: &T) -> Result<()>
where
    T: Validate<Context = ()>,
{
    payload.validate().map_err(|report| {
        let message = report
            .iter()
            .next()
            .map(|(path, error)| format!("{}: {}", path, error))
            .unwrap_or_else(|| "invalid payload".to_string());
        AppError::Validation(message)
    })
}

/// `garde` rule for `yyyy-mm-dd` birth dates.
pub fn birth_date(value: &str, _context: &()) -> garde::Result {
    parse_birth_date(value)
        .map(|_| ())
        .map_err(|_| garde::Error::new("invalid date, expected format: yyyy-mm-dd"))
}

/// Parses a birth date that already passed [`birth_date`].
pub fn parse_birth_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::Validation("data_nascimento: invalid date, expected format: yyyy-mm-dd".into())
    })
}

/// Validates a phone number.
pub fn validate_phone(phone: &str) -> Result<()> {
    if phone.len() != PHONE_LEN {
        return Err(AppError::Validation(format!(
            "celular must have exactly {} characters",
            PHONE_LEN
        )));
    }
    Ok(())
}

/// Checks that both login fields are present.
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("email and senha are required".to_string()));
    }
    Ok(())
}

/// Validates a password change request.
///
/// A current password shorter than the minimum cannot match any stored hash,
/// so it is rejected before touching storage.
pub fn validate_password_change(current: &str, new: &str) -> Result<()> {
    if current.len() < MIN_TEXT_LEN {
        return Err(AppError::Validation("senha_atual is incorrect".to_string()));
    }
    if new.len() < MIN_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "senha_nova must be at least {} characters long",
            MIN_TEXT_LEN
        )));
    }
    Ok(())
}
