//! Menu cache invalidation channel configuration.
//!
//! After every write that can change a user's resolved menus, the engine
//! publishes `{"userId": <id>}`. Subscribers inside the process always receive
//! it; when `REDIS_URL` is set it is also published on a Redis channel so
//! other processes holding menu caches can drop them.
//!
//! # Environment Variables
//!
//! - `REDIS_URL`: Redis connection URL (optional, in-process only when unset)
//! - `INVALIDATION_CHANNEL`: Redis channel name (default: `menuward:menus:invalidate`)
//! - `INVALIDATION_CAPACITY`: In-process broadcast buffer size (default: 1024)

use crate::{env_opt, env_or};

pub const DEFAULT_CHANNEL: &str = "menuward:menus:invalidate";
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidationConfig {
    pub redis_url: Option<String>,
    pub channel: String,
    pub capacity: usize,
}

impl Default for InvalidationConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            channel: DEFAULT_CHANNEL.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl InvalidationConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: env_opt("REDIS_URL"),
            channel: env_opt("INVALIDATION_CHANNEL").unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            // A zero-capacity broadcast channel panics on creation.
            capacity: env_or("INVALIDATION_CAPACITY", DEFAULT_CAPACITY).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InvalidationConfig::default();
        assert!(config.redis_url.is_none());
        assert_eq!(config.channel, "menuward:menus:invalidate");
        assert_eq!(config.capacity, 1024);
    }
}
