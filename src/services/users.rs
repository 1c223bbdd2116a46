use crate::crypto::password::{hash_password, verify_password};
use crate::error::{AppError, Result};
use crate::models::user::{AccountChanges, NewUser, Profile, Registration};
use zeroize::Zeroize;
use crate::state::AppState;

/// Registers a user, hashing their password.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `registration` - The validated sign-up fields.
///
/// # Returns
///
/// A `Result` containing the created `Profile`.
pub async fn create_user(state: &AppState, mut registration: Registration) -> Result<Profile> {
    let password_hash = hash_password(&registration.password);
    registration.password.zeroize();

    let user = NewUser {
        first_name: registration.first_name,
        last_name: registration.last_name,
        nickname: registration.nickname,
        phone: registration.phone,
        email: registration.email,
        sex: registration.sex,
        birth_date: registration.birth_date,
        password_hash: password_hash?,
    };
    let user = state.users.create_user(user).await?;
    tracing::info!("✅ User created with ID: {}", user.id);
    Ok(user.into())
}

/// Fetches the profile of the logged-in user.
pub async fn profile(state: &AppState, user_id: i32) -> Result<Profile> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .map(Profile::from)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))
}

pub async fn update_account(state: &AppState, user_id: i32, changes: AccountChanges) -> Result<()> {
    state.users.update_account(user_id, changes).await
}

pub async fn update_phone(state: &AppState, user_id: i32, phone: &str) -> Result<()> {
    state.users.update_phone(user_id, phone).await
}

pub async fn update_email(state: &AppState, user_id: i32, email: &str) -> Result<()> {
    state.users.update_email(user_id, email).await
}

/// Changes a user's password.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_id` - The ID of the user.
/// * `current_password` - The user's current password.
/// * `new_password` - The user's new password.
///
/// # Returns
///
/// A `Result<()>`; a wrong current password is an authentication error.
pub async fn change_password(
    state: &AppState,
    user_id: i32,
    current_password: &str,
    new_password: &str,
) -> Result<()> {
    tracing::info!("🔑 Changing password for user: {}", user_id);

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;

    if !verify_password(current_password, &user.password_hash)? {
        return Err(AppError::Authentication(
            "Invalid current password".to_string(),
        ));
    }

    let new_hash = hash_password(new_password)?;
    state.users.update_password(user_id, &new_hash).await?;

    tracing::info!("✅ Password changed for user: {}", user_id);
    Ok(())
}
