//! API routes module

pub mod health;
pub mod users;

use axum::Router;
use database::postgres::DatabaseConnection;

/// Create all API routes. Probe routes (`/health`, `/ready`) are merged at
/// the root in `main`, not nested under `/api`.
pub fn routes(db: Option<DatabaseConnection>, seed_count: usize) -> Router {
    Router::new().nest("/user", users::router(db, seed_count))
}
