//! # Menuward DB
//!
//! Database pool and the authorization store.
//!
//! [`AuthzStore`] is the query boundary the engine talks through. Two
//! implementations are provided:
//!
//! - [`PgStore`]: PostgreSQL via SQLx, schema in `migrations/`
//! - [`MemoryStore`]: in-process tables behind a lock, for tests and embedding
//!
//! # Example
//!
//! ```ignore
//! use menuward_config::DatabaseConfig;
//! use menuward_db::{PgStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! let store = PgStore::new(pool);
//! ```

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{AuthzStore, StoreResult};

use menuward_config::DatabaseConfig;
use menuward_core::AppError;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Opens a PostgreSQL connection pool.
///
/// The pool is cheaply cloneable and should be created once at startup.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "Database pool initialized"
    );
    Ok(pool)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
