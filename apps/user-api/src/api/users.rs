//! Users API routes

use axum::Router;
use database::postgres::DatabaseConnection;
use domain_users::{handlers, InMemoryUserRepository, PostgresUserRepository, UserService};
use tracing::info;

/// Create the users router, backed by Postgres when a connection is
/// available and by the seeded in-memory repository otherwise.
pub fn router(db: Option<DatabaseConnection>, seed_count: usize) -> Router {
    match db {
        Some(db) => {
            let repository = PostgresUserRepository::new(db);
            handlers::router(UserService::new(repository))
        }
        None => {
            info!("No database configured, serving {} seeded users", seed_count);
            let repository = InMemoryUserRepository::seeded(seed_count);
            handlers::router(UserService::new(repository))
        }
    }
}
