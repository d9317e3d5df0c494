//! # Menuward Cache
//!
//! Cache invalidation signalling for resolved menu trees.
//!
//! The engine never reads or writes a menu cache. After every write that can
//! change a user's resolved menus it publishes a [`MenuInvalidation`] on the
//! [`InvalidationBus`]; downstream collaborators holding cached trees drop the
//! keys matching [`MenuInvalidation::cache_pattern`].
//!
//! # Example
//!
//! ```ignore
//! use menuward_cache::InvalidationBus;
//! use menuward_config::InvalidationConfig;
//!
//! let bus = InvalidationBus::from_config(&InvalidationConfig::from_env()).await?;
//! let mut rx = bus.subscribe();
//! bus.publish(user_id).await;
//! assert_eq!(rx.recv().await?.user_id, user_id);
//! ```

pub mod invalidation;
pub mod keys;
pub mod redis;

pub use self::redis::{CacheError, RedisPublisher};
pub use invalidation::{InvalidationBus, MenuInvalidation};
