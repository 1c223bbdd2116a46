use std::{env, net::SocketAddr};
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// The default address the server binds to.
const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";
/// The default CORS origin (local frontend).
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database; `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// The secret used to sign session tokens.
    pub secret_key: Zeroizing<Vec<u8>>,
    /// The address the HTTP server binds to.
    pub server_addr: SocketAddr,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a `Config` reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret_key = lookup("SECRET_KEY")
            .map(|value| Zeroizing::new(value.into_bytes()))
            .context("SECRET_KEY must be set (generate with: openssl rand -hex 32)")?;

        if secret_key.is_empty() {
            anyhow::bail!("SECRET_KEY must not be empty");
        }

        let server_addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string())
            .parse()
            .context("Invalid SERVER_ADDR")?;

        let cors_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            secret_key,
            server_addr,
            cors_origins,
        })
    }
}
