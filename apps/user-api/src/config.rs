//! Configuration for User API

use core_config::{server::ServerConfig, FromEnv};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub environment: Environment,
    /// Present only when `DATABASE_URL` is set; otherwise the app runs on
    /// the seeded in-memory repository.
    pub database: Option<PostgresConfig>,
    /// Number of users pre-loaded into the in-memory repository.
    pub seed_count: usize,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;

        let database = match std::env::var("DATABASE_URL") {
            Ok(_) => Some(PostgresConfig::from_env()?),
            Err(_) => None,
        };

        let seed_count = std::env::var("SEED_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        Ok(Self {
            server,
            environment,
            database,
            seed_count,
        })
    }
}
