use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;

/// A single water-consumption record.
///
/// A user has at most one record per `consumed_at` instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WaterIntake {
    #[serde(rename = "usuario_matricula")]
    pub user_id: i32,
    #[serde(rename = "data")]
    pub consumed_at: DateTime<Utc>,
    /// Amount in millilitres.
    #[serde(rename = "quantidade")]
    pub amount: i32,
}

impl From<&Row> for WaterIntake {
    fn from(row: &Row) -> Self {
        Self {
            user_id: row.get("usuario_matricula"),
            consumed_at: row.get("data_consumo"),
            amount: row.get("quantidade"),
        }
    }
}
