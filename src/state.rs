use std::sync::Arc;

use menuward_cache::InvalidationBus;
use menuward_db::AuthzStore;

use crate::modules::checks::PermissionChecker;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AuthzStore>,
    pub invalidation: InvalidationBus,
    pub checker: PermissionChecker,
}

impl AppState {
    pub fn new(store: Arc<dyn AuthzStore>, invalidation: InvalidationBus) -> Self {
        let checker = PermissionChecker::new(store.clone());
        Self {
            store,
            invalidation,
            checker,
        }
    }

    pub fn store(&self) -> &dyn AuthzStore {
        self.store.as_ref()
    }
}
