//! Menuward Observability Module
//!
//! - Structured logging via `tracing`, with an optional JSON rolling file
//! - HTTP request logging middleware
//! - Prometheus metrics for HTTP traffic and authorization decisions
//!
//! Metric helpers are no-ops until [`init_metrics`] installs a recorder, so
//! library code can call them unconditionally.
//!
//! # Examples
//!
//! ```no_run
//! use menuward_config::{LoggingConfig, MetricsConfig};
//! use menuward_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     init_tracing(&LoggingConfig::from_env())?;
//!     let _handle = init_metrics(&MetricsConfig::from_env())?;
//!     Ok(())
//! }
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, logging_middleware};
pub use self::metrics::{
    PrometheusHandle, init_metrics, metrics_app, metrics_middleware, track_assignment_change,
    track_invalidation_published, track_permission_check,
};
