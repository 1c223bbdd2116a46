use crate::crypto::password::verify_password;
use crate::error::{AppError, Result};
use crate::models::session::LoginResponse;
use crate::state::AppState;

/// Logs a user in.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `email` - The user's email.
/// * `password` - The user's plain-text password.
///
/// # Returns
///
/// A `Result` containing the user's `matricula` and a whitelisted token.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<LoginResponse> {
    tracing::debug!("🔐 Authenticating user: {}", email);

    let credentials = state
        .users
        .find_credentials_by_email(email)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

    if !verify_password(password, &credentials.password_hash)? {
        return Err(AppError::Authentication(
            "Invalid email or password".to_string(),
        ));
    }

    let token = state.tokens.issue(credentials.id)?;
    state.whitelist.store(credentials.id, &token).await?;

    tracing::info!("✅ User logged in: {}", credentials.id);

    Ok(LoginResponse {
        matricula: credentials.id,
        token,
    })
}

/// Logs a user out by removing their token from the whitelist.
pub async fn logout(state: &AppState, user_id: i32, token: &str) -> Result<()> {
    state.whitelist.revoke(user_id, token).await?;
    tracing::info!("👋 User logged out: {}", user_id);
    Ok(())
}
