use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{calendar::Range, error::Result, models::water::WaterIntake};

/// Storage of water-consumption records, keyed by `(user_id, consumed_at)`.
#[async_trait]
pub trait WaterRepository: Send + Sync {
    async fn create_intake(&self, intake: &WaterIntake) -> Result<()>;

    async fn find_intake(
        &self,
        user_id: i32,
        consumed_at: DateTime<Utc>,
    ) -> Result<Option<WaterIntake>>;

    /// Moves and/or changes the record at `consumed_at`.
    ///
    /// Fails with `NotFound` when the user has no record at that instant.
    async fn update_intake(
        &self,
        user_id: i32,
        consumed_at: DateTime<Utc>,
        new_consumed_at: DateTime<Utc>,
        amount: i32,
    ) -> Result<()>;

    /// Fails with `NotFound` when the user has no record at that instant.
    async fn delete_intake(&self, user_id: i32, consumed_at: DateTime<Utc>) -> Result<()>;

    /// Records inside `range`, oldest first.
    async fn list_intakes(&self, user_id: i32, range: Range) -> Result<Vec<WaterIntake>>;
}
