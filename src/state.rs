use std::sync::Arc;

use crate::config::Config;
use crate::crypto::token::TokenService;
use crate::error::Result;
use crate::repositories::{
    memory::MemoryStore, postgres::PgStore, user::UserRepository, water::WaterRepository,
    whitelist::SessionWhitelist,
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// User account storage.
    pub users: Arc<dyn UserRepository>,
    /// Water-consumption storage.
    pub water: Arc<dyn WaterRepository>,
    /// Whitelist of issued session tokens.
    pub whitelist: Arc<dyn SessionWhitelist>,
    /// Session token issuer and verifier.
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// Connects to PostgreSQL when `config.database_url` is set, otherwise
    /// falls back to the in-memory store.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let tokens = TokenService::new(&config.secret_key);

        match config.database_url.as_deref() {
            Some(database_url) => {
                let pool = crate::db::create_pool(database_url)?;
                tracing::info!("✅ PostgreSQL pool initialized with deadpool-postgres");

                crate::db::ensure_schema(&pool).await?;
                tracing::info!("✅ Database schema verified");

                Ok(Self::with_store(Arc::new(PgStore::new(pool)), tokens))
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL not set, using in-memory storage (data is lost on restart)");
                Ok(Self::with_store(Arc::new(MemoryStore::new()), tokens))
            }
        }
    }

    /// Builds the state around a single store backing every repository.
    pub fn with_store<S>(store: Arc<S>, tokens: TokenService) -> Self
    where
        S: UserRepository + WaterRepository + SessionWhitelist + 'static,
    {
        Self {
            users: store.clone(),
            water: store.clone(),
            whitelist: store,
            tokens: Arc::new(tokens),
        }
    }
}
