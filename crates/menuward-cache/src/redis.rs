//! Redis publisher for cross-process invalidation.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::Serialize;
use tracing::{debug, instrument};

/// Error type for cache signalling.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Publishes JSON messages on one Redis channel.
#[derive(Clone)]
pub struct RedisPublisher {
    conn: ConnectionManager,
    channel: String,
}

impl std::fmt::Debug for RedisPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPublisher")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl RedisPublisher {
    /// Connects to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the connection fails.
    pub async fn connect(redis_url: &str, channel: impl Into<String>) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            channel: channel.into(),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Publishes `message` as JSON, returning the number of receivers.
    #[instrument(skip(self, message), fields(channel = %self.channel))]
    pub async fn publish<T>(&self, message: &T) -> Result<u64, CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(message)?;

        let receivers: u64 = conn.publish(&self.channel, json).await?;

        debug!(receivers, "Invalidation published to Redis");

        Ok(receivers)
    }
}
