pub mod assignments;
pub mod catalog;
pub mod checks;
pub mod menus;
pub mod permissions;
pub mod roles;

pub use self::assignments::Actor;
pub use self::checks::PermissionChecker;
