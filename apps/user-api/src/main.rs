//! User API - REST server for user management

use axum_helpers::server::health_router;
use axum_helpers::{create_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = match &config.database {
        Some(pg_config) => {
            info!("Connecting to PostgreSQL");
            let db =
                database::postgres::connect_from_config_with_retry(pg_config.clone(), None).await?;
            info!("Successfully connected to PostgreSQL");
            Some(db)
        }
        None => None,
    };

    let api_routes = api::routes(db.clone(), config.seed_count);
    let router = create_router::<openapi::ApiDoc>(api_routes);
    let app = router
        .merge(health_router("user-api"))
        .merge(api::health::router(db));

    info!("Starting User API on port {}", config.server.port);

    create_app(app, &config.server).await?;

    info!("User API shutdown complete");
    Ok(())
}
