use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio_postgres::Row;

/// Represents a user account as stored, password hash included.
#[derive(Clone, Debug)]
pub struct User {
    /// The user's `matricula`, assigned by storage.
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    /// Eleven-character phone number.
    pub phone: String,
    pub email: String,
    /// Single-character sex marker.
    pub sex: String,
    pub birth_date: NaiveDate,
    /// The user's hashed password.
    pub password_hash: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}

impl From<&Row> for User {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("matricula"),
            first_name: row.get("nome"),
            last_name: row.get("sobrenome"),
            nickname: row.get("apelido"),
            phone: row.get("celular"),
            email: row.get("email"),
            sex: row.get("sexo"),
            birth_date: row.get("data_nascimento"),
            password_hash: row.get("senha"),
            created_at: row.get("data_criacao"),
        }
    }
}

/// A validated sign-up request.
#[derive(Clone, Debug)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub phone: String,
    pub email: String,
    pub sex: String,
    pub birth_date: NaiveDate,
    pub password: String,
}

/// Fields needed to store a user; the password is already hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub phone: String,
    pub email: String,
    pub sex: String,
    pub birth_date: NaiveDate,
    pub password_hash: String,
}

/// Account fields editable through `PUT /usuarios/conta`.
#[derive(Clone, Debug)]
pub struct AccountChanges {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub sex: String,
    pub birth_date: NaiveDate,
}

/// What a client sees of a user account.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    #[serde(rename = "matricula")]
    pub id: i32,
    #[serde(rename = "nome")]
    pub first_name: String,
    #[serde(rename = "sobrenome")]
    pub last_name: String,
    #[serde(rename = "apelido")]
    pub nickname: String,
    #[serde(rename = "celular")]
    pub phone: String,
    pub email: String,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "data_nascimento")]
    pub birth_date: NaiveDate,
    #[serde(rename = "data_criacao")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            nickname: user.nickname,
            phone: user.phone,
            email: user.email,
            sex: user.sex,
            birth_date: user.birth_date,
            created_at: user.created_at,
        }
    }
}

/// The `matricula` and password hash looked up at login.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub id: i32,
    pub password_hash: String,
}
