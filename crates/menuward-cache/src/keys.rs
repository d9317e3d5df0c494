//! Cache keys for resolved menu trees.
//!
//! Collaborators caching `get_user_menu_tree` output key it as
//! `menuward:menus:<user_id>:<locale>`; an invalidation for a user covers every
//! locale.

use menuward_models::UserId;

/// Prefix for all cache keys to avoid collisions with other Redis users.
const CACHE_PREFIX: &str = "menuward";

/// Builds a cache key with the standard prefix.
fn build_key(parts: &[&str]) -> String {
    format!("{}:{}", CACHE_PREFIX, parts.join(":"))
}

/// Pattern matching every locale of one user's tree.
pub fn menu_tree_pattern(user_id: UserId) -> String {
    build_key(&["menus", &user_id.to_string(), "*"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_covers_all_locales() {
        let pattern = menu_tree_pattern(UserId::new(42));
        assert_eq!(pattern, "menuward:menus:42:*");
        assert!(!menu_tree_pattern(UserId::new(420)).starts_with(pattern.trim_end_matches('*')));
    }
}
