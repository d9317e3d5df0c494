use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use menuward::menuward_cache::InvalidationBus;
use menuward::menuward_config::{
    DatabaseConfig, InvalidationConfig, LoggingConfig, MetricsConfig, ServerConfig,
};
use menuward::menuward_db::{PgStore, init_db_pool, run_migrations};
use menuward::menuward_observability::{init_metrics, init_tracing, metrics_app};
use menuward::router::init_router;
use menuward::state::AppState;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing(&LoggingConfig::from_env())?;

    let metrics_config = MetricsConfig::from_env();
    if let Some(handle) = init_metrics(&metrics_config)? {
        let addr = format!("0.0.0.0:{}", metrics_config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {}", addr))?;
        info!(%addr, "Metrics available at /metrics");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics listener stopped");
            }
        });
    }

    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&db_config).await.map_err(|e| e.error)?;
    run_migrations(&pool).await.map_err(|e| e.error)?;

    let invalidation = InvalidationBus::from_config(&InvalidationConfig::from_env()).await?;
    let state = AppState::new(Arc::new(PgStore::new(pool)), invalidation);
    let app = init_router(state);

    let server_config = ServerConfig::from_env();
    let addr = server_config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
