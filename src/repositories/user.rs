use async_trait::async_trait;

use crate::{
    error::Result,
    models::user::{AccountChanges, Credentials, NewUser, User},
};

/// Storage of user accounts.
///
/// Every update reports [`AppError::NotFound`](crate::error::AppError::NotFound)
/// when no account has the given id.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns it with its assigned `matricula`.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Finds the `matricula` and password hash registered for `email`.
    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<Credentials>>;

    /// Finds a user by their ID.
    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>>;

    async fn update_account(&self, user_id: i32, changes: AccountChanges) -> Result<()>;

    async fn update_phone(&self, user_id: i32, phone: &str) -> Result<()>;

    async fn update_email(&self, user_id: i32, email: &str) -> Result<()>;

    async fn update_password(&self, user_id: i32, password_hash: &str) -> Result<()>;
}
