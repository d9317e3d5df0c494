//! Request identity and permission gates.
//!
//! Identity is established upstream; this service only reads the numeric
//! user id from the `x-user-id` header.
//!
//! # Modules
//!
//! - [`actor`]: The [`AuthUser`](actor::AuthUser) extractor
//! - [`permission`]: Route layers that require a permission code
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware};
//! use crate::middleware::permission::require_users_assign;
//!
//! let routes = init_user_roles_router()
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_users_assign));
//! ```

pub mod actor;
pub mod permission;
