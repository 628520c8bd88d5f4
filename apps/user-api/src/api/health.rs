//! Readiness endpoint

use axum::{http::StatusCode, routing::get, Json, Router};
use database::postgres::DatabaseConnection;
use serde::Serialize;

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    service: String,
    version: String,
}

async fn ready(db: Option<DatabaseConnection>) -> Result<Json<ReadyResponse>, StatusCode> {
    if let Some(db) = db {
        database::postgres::check_health(&db)
            .await
            .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    }

    Ok(Json(ReadyResponse {
        status: "ready".to_string(),
        service: "user-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

pub fn router(db: Option<DatabaseConnection>) -> Router {
    Router::new().route("/ready", get(move || ready(db)))
}
