//! Logging and metrics configuration.
//!
//! # Environment Variables
//!
//! - `LOG_LEVEL`: Level for the `menuward` targets when `RUST_LOG` is unset (default: `info`)
//! - `LOG_DIR`: Directory for daily-rolling JSON logs (optional, console only when unset)
//! - `OBSERVABILITY_ENABLED`: `false` or `0` disables the metrics exporter (default: enabled)
//! - `METRICS_PORT`: Port of the Prometheus `/metrics` listener (default: 9090)

use crate::{env_opt, env_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub json_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: env_opt("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            json_dir: env_opt("LOG_DIR"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

impl MetricsConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env_opt("OBSERVABILITY_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            port: env_or("METRICS_PORT", 9090),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(LoggingConfig::default().level, "info");
        assert!(LoggingConfig::default().json_dir.is_none());
        assert!(MetricsConfig::default().enabled);
        assert_eq!(MetricsConfig::default().port, 9090);
    }

    #[test]
    fn test_config_clone() {
        let config = MetricsConfig::default();
        assert_eq!(config.clone(), config);
    }
}
