use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};
use serde::Deserialize;

use crate::{
    error::Result,
    extract::JsonBody,
    models::session::AuthenticatedUser,
    response,
    services::auth as auth_service,
    state::AppState,
    validation::user::validate_login,
};

/// The request payload for user login.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String,
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt for: {}", payload.email);
    validate_login(&payload.email, &payload.senha)?;

    let session = auth_service::login(&state, &payload.email, &payload.senha).await?;

    response::json(StatusCode::OK, &session)
}

/// Handles user logout.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Response> {
    auth_service::logout(&state, user.user_id, &user.token).await?;
    Ok(response::no_content())
}
