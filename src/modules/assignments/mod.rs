//! User-level writes: role assignments and direct permission overrides.

pub mod controller;
pub mod guard;
pub mod router;
pub mod service;

use menuward_cache::InvalidationBus;
use menuward_models::UserId;
use menuward_observability::track_invalidation_published;

pub use guard::Actor;

/// Tells menu caches that the listed users' trees are stale.
pub(crate) async fn invalidate_menus<I>(bus: &InvalidationBus, user_ids: I)
where
    I: IntoIterator<Item = UserId>,
{
    let user_ids: Vec<UserId> = user_ids.into_iter().collect();
    if user_ids.is_empty() {
        return;
    }
    let count = user_ids.len();
    bus.publish_many(user_ids).await;
    track_invalidation_published(count);
}
