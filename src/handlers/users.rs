use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};
use garde::Validate;
use serde::Deserialize;

use crate::{
    error::Result,
    extract::JsonBody,
    models::{
        session::AuthenticatedUser,
        user::{AccountChanges, Registration},
    },
    response,
    services::users as user_service,
    state::AppState,
    validation::user::{
        birth_date, parse_birth_date, validate_password_change, validate_payload, validate_phone,
    },
};

/// The request payload for creating an account.
#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[garde(length(min = 2))]
    pub nome: String,
    #[serde(default)]
    #[garde(length(min = 2))]
    pub sobrenome: String,
    #[serde(default)]
    #[garde(length(min = 2))]
    pub apelido: String,
    #[serde(default)]
    #[garde(length(min = 1, max = 1))]
    pub sexo: String,
    #[serde(default)]
    #[garde(length(min = 11, max = 11))]
    pub celular: String,
    #[serde(default)]
    #[garde(custom(birth_date))]
    pub data_nascimento: String,
    #[serde(default)]
    #[garde(email)]
    pub email: String,
    #[serde(default)]
    #[garde(length(min = 2))]
    pub senha: String,
}

impl CreateUserRequest {
    fn trimmed(mut self) -> Self {
        self.nome = self.nome.trim().to_string();
        self.sobrenome = self.sobrenome.trim().to_string();
        self.apelido = self.apelido.trim().to_string();
        self.sexo = self.sexo.trim().to_string();
        self.celular = self.celular.trim().to_string();
        self.senha = self.senha.trim().to_string();
        self
    }
}

/// The request payload for `PUT /usuarios/conta`.
#[derive(Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    #[garde(length(min = 2))]
    pub nome: String,
    #[serde(default)]
    #[garde(length(min = 2))]
    pub sobrenome: String,
    #[serde(default)]
    #[garde(length(min = 2))]
    pub apelido: String,
    #[serde(default)]
    #[garde(length(min = 1, max = 1))]
    pub sexo: String,
    #[serde(default)]
    #[garde(custom(birth_date))]
    pub data_nascimento: String,
}

impl UpdateAccountRequest {
    fn trimmed(mut self) -> Self {
        self.nome = self.nome.trim().to_string();
        self.sobrenome = self.sobrenome.trim().to_string();
        self.apelido = self.apelido.trim().to_string();
        self.sexo = self.sexo.trim().to_string();
        self
    }
}

#[derive(Deserialize)]
pub struct UpdatePhoneRequest {
    #[serde(default)]
    pub celular: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateEmailRequest {
    #[serde(default)]
    #[garde(email)]
    pub email: String,
}

/// The request payload for changing a user's password.
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub senha_atual: String,
    #[serde(default)]
    pub senha_nova: String,
}

/// Handles account creation.
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<Response> {
    let payload = payload.trimmed();
    validate_payload(&payload)?;

    tracing::info!("📝 Registering user: {}", payload.email);

    let registration = Registration {
        birth_date: parse_birth_date(&payload.data_nascimento)?,
        first_name: payload.nome,
        last_name: payload.sobrenome,
        nickname: payload.apelido,
        phone: payload.celular,
        email: payload.email,
        sex: payload.sexo,
        password: payload.senha,
    };

    let profile = user_service::create_user(&state, registration).await?;

    response::json(StatusCode::CREATED, &profile)
}

/// Returns the logged-in user's profile.
#[axum::debug_handler]
pub async fn logged_in(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Response> {
    let profile = user_service::profile(&state, user.user_id).await?;
    response::json(StatusCode::OK, &profile)
}

#[axum::debug_handler]
pub async fn update_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(payload): JsonBody<UpdateAccountRequest>,
) -> Result<Response> {
    let payload = payload.trimmed();
    validate_payload(&payload)?;

    let changes = AccountChanges {
        birth_date: parse_birth_date(&payload.data_nascimento)?,
        first_name: payload.nome,
        last_name: payload.sobrenome,
        nickname: payload.apelido,
        sex: payload.sexo,
    };

    user_service::update_account(&state, user.user_id, changes).await?;
    Ok(response::no_content())
}

#[axum::debug_handler]
pub async fn update_phone(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(payload): JsonBody<UpdatePhoneRequest>,
) -> Result<Response> {
    let phone = payload.celular.trim();
    validate_phone(phone)?;

    user_service::update_phone(&state, user.user_id, phone).await?;
    Ok(response::no_content())
}

#[axum::debug_handler]
pub async fn update_email(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(payload): JsonBody<UpdateEmailRequest>,
) -> Result<Response> {
    validate_payload(&payload)?;

    user_service::update_email(&state, user.user_id, &payload.email).await?;
    Ok(response::no_content())
}

/// Handles changing a user's password.
#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> Result<Response> {
    let current = payload.senha_atual.trim();
    let new = payload.senha_nova.trim();
    validate_password_change(current, new)?;

    user_service::change_password(&state, user.user_id, current, new).await?;
    Ok(response::no_content())
}
