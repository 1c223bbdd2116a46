use serde::Serialize;

/// The caller identity injected by the authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The caller's `matricula`, read from the token claims.
    pub user_id: i32,
    /// The bearer token that authenticated the request.
    pub token: String,
}

/// Body returned by a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub matricula: i32,
    pub token: String,
}
