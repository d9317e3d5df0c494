//! Menu invalidation bus.
//!
//! Messages always go to in-process subscribers through a broadcast channel.
//! When Redis is configured they are also published on the configured channel
//! for other processes.
//!
//! Publishing happens after the triggering write has committed, so a failed
//! publish is logged and never turns a successful write into an error.

use std::collections::BTreeSet;

use menuward_config::InvalidationConfig;
use menuward_models::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::keys;
use crate::redis::{CacheError, RedisPublisher};

/// Wire shape: `{"userId": <id>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuInvalidation {
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

impl MenuInvalidation {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Pattern of the cache keys this message invalidates.
    pub fn cache_pattern(&self) -> String {
        keys::menu_tree_pattern(self.user_id)
    }
}

#[derive(Debug, Clone)]
pub struct InvalidationBus {
    local: broadcast::Sender<MenuInvalidation>,
    redis: Option<RedisPublisher>,
}

impl InvalidationBus {
    /// In-process bus buffering up to `capacity` messages per slow subscriber.
    pub fn new(capacity: usize) -> Self {
        let (local, _) = broadcast::channel(capacity.max(1));
        Self { local, redis: None }
    }

    pub fn with_redis(mut self, publisher: RedisPublisher) -> Self {
        self.redis = Some(publisher);
        self
    }

    /// Builds the bus, connecting to Redis when `redis_url` is set.
    pub async fn from_config(config: &InvalidationConfig) -> Result<Self, CacheError> {
        let bus = Self::new(config.capacity);
        match &config.redis_url {
            Some(url) => {
                let publisher = RedisPublisher::connect(url, config.channel.clone()).await?;
                info!(channel = %config.channel, "Menu invalidation published to Redis");
                Ok(bus.with_redis(publisher))
            }
            None => {
                info!("Redis not configured, menu invalidation is local-only");
                Ok(bus)
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MenuInvalidation> {
        self.local.subscribe()
    }

    pub async fn publish(&self, user_id: UserId) {
        let message = MenuInvalidation::new(user_id);
        let pattern = message.cache_pattern();
        debug!(user_id = %user_id, pattern, "Publishing menu invalidation");

        // No receivers is not an error: nobody caches menus in this process.
        let _ = self.local.send(message);

        if let Some(redis) = &self.redis {
            if let Err(e) = redis.publish(&message).await {
                warn!(user_id = %user_id, error = %e, "Redis invalidation publish failed");
            }
        }
    }

    /// Publishes once per distinct user.
    pub async fn publish_many<I>(&self, user_ids: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        let distinct: BTreeSet<UserId> = user_ids.into_iter().collect();
        for user_id in distinct {
            self.publish(user_id).await;
        }
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(menuward_config::invalidation::DEFAULT_CAPACITY)
    }
}
