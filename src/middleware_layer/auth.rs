use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{
    crypto::token,
    error::AppError,
    models::session::AuthenticatedUser,
    state::AppState,
};

/// A middleware that requires a valid, whitelisted bearer token.
///
/// Checks run in order and stop at the first failure: header format,
/// signature, whitelist, subject claim. A storage failure during the
/// whitelist lookup is a server error, not an authentication failure.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream `Response`, or the `AppError` that stopped the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let token = token::extract_from_request(request.headers())?;

    state.tokens.validate(&token)?;

    match state.whitelist.lookup(&token).await {
        Ok(_) => {}
        Err(AppError::NotFound(_)) => {
            tracing::warn!("❌ Token is not whitelisted");
            return Err(AppError::Authentication(
                "Token is not whitelisted".to_string(),
            ));
        }
        Err(e) => return Err(e),
    }

    let user_id = state.tokens.extract_subject(&token)?;

    tracing::debug!("✅ User authenticated: {}", user_id);

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id, token });

    Ok(next.run(request).await)
}
