//! # Menuward Core
//!
//! Foundational types shared by every Menuward crate:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination utilities for list endpoints
//! - [`permissions`]: Permission code parsing and admin console constants
//!
//! # Example
//!
//! ```ignore
//! use menuward_core::errors::AppError;
//! use menuward_core::permissions::PermissionCode;
//!
//! let err = AppError::conflict(anyhow::anyhow!("Role code already exists"));
//! let code = PermissionCode::menu("posts", "publish");
//! ```

pub mod errors;
pub mod pagination;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorKind};
pub use pagination::{PaginationMeta, PaginationParams};
pub use permissions::{PermissionCode, ResourceType};
