//! # Menuward Config
//!
//! Configuration types for Menuward.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: HTTP bind address
//! - [`invalidation`]: Menu cache invalidation channel
//! - [`observability`]: Log level, log files and the metrics exporter
//!
//! # Example
//!
//! ```ignore
//! use menuward_config::{DatabaseConfig, InvalidationConfig, ServerConfig};
//!
//! let database = DatabaseConfig::from_env()?;
//! let server = ServerConfig::from_env();
//! let invalidation = InvalidationConfig::from_env();
//! ```

pub mod database;
pub mod invalidation;
pub mod observability;
pub mod server;

// Re-export commonly used types at crate root
pub use database::DatabaseConfig;
pub use invalidation::InvalidationConfig;
pub use observability::{LoggingConfig, MetricsConfig};
pub use server::ServerConfig;

/// Reads `key` and parses it, falling back to `default` when unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Reads `key`, treating blank values as unset.
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
