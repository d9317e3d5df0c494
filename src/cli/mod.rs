//! Operator commands backing the `menuward-cli` binary.
//!
//! Operators act as [`Actor::Operator`], so the escalation guard does not
//! apply; this is how the first holder of the top system role is created.

pub mod seeder;

use anyhow::anyhow;
use menuward_cache::InvalidationBus;
use menuward_core::AppError;
use menuward_db::AuthzStore;
use menuward_models::{UserId, UserRoleAssignment};

use crate::modules::assignments::{Actor, service as assignments};
use crate::modules::permissions::service as permissions;

pub use seeder::{SeedReport, seed_catalog};

/// Assigns the role with `role_code` to `user_id`.
pub async fn assign_role(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    user_id: UserId,
    role_code: &str,
) -> Result<UserRoleAssignment, AppError> {
    let role = store
        .find_role_by_code(role_code)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Role {} not found", role_code)))?;

    assignments::assign_role_to_user(store, bus, user_id, role.id, &Actor::Operator).await
}

/// Resolves one permission for one user.
pub async fn check(store: &dyn AuthzStore, user_id: UserId, code: &str) -> bool {
    permissions::check_permission(store, user_id, code).await
}
