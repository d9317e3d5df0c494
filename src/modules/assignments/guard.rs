//! Privilege escalation guard.
//!
//! Only a holder of the top system role (lowest level among system roles)
//! may hand that role out. Local operator tooling bypasses the check.

use anyhow::anyhow;
use menuward_core::AppError;
use menuward_db::AuthzStore;
use menuward_models::{Role, RoleId, UserId};

/// Who is performing a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// Trusted local tooling such as the CLI and seeders.
    Operator,
    /// An end user acting through the admin surface, with their active role ids.
    User { id: UserId, role_ids: Vec<RoleId> },
}

impl Actor {
    /// Loads the active roles of `user_id`.
    pub async fn load(store: &dyn AuthzStore, user_id: UserId) -> Result<Self, AppError> {
        let role_ids = store
            .user_roles(user_id)
            .await?
            .into_iter()
            .filter(|r| r.is_active)
            .map(|r| r.id)
            .collect();
        Ok(Self::User {
            id: user_id,
            role_ids,
        })
    }

    /// Recorded as `granted_by` / `assigned_by` / `created_by`.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Operator => None,
            Self::User { id, .. } => Some(*id),
        }
    }

    fn holds(&self, role_id: RoleId) -> bool {
        match self {
            Self::Operator => true,
            Self::User { role_ids, .. } => role_ids.contains(&role_id),
        }
    }
}

/// Fails with `Forbidden` when `roles` contains the top system role and the
/// actor does not hold it.
pub async fn ensure_may_assign(
    store: &dyn AuthzStore,
    actor: &Actor,
    roles: &[&Role],
) -> Result<(), AppError> {
    if matches!(actor, Actor::Operator) {
        return Ok(());
    }

    let Some(top) = store.top_system_role().await? else {
        return Ok(());
    };

    if roles.iter().any(|r| r.id == top.id) && !actor.holds(top.id) {
        return Err(AppError::forbidden(anyhow!(
            "Only holders of the {} role may assign it",
            top.code
        )));
    }

    Ok(())
}
