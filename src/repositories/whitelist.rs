use async_trait::async_trait;

use crate::error::Result;

/// Issued session tokens that have not been logged out.
#[async_trait]
pub trait SessionWhitelist: Send + Sync {
    /// Records a freshly issued token.
    async fn store(&self, user_id: i32, token: &str) -> Result<()>;

    /// Removes the token, failing with `NotFound` when it was not stored for
    /// `user_id`.
    async fn revoke(&self, user_id: i32, token: &str) -> Result<()>;

    /// Returns the user the token was stored for, failing with `NotFound` when
    /// it is not whitelisted.
    async fn lookup(&self, token: &str) -> Result<i32>;
}
