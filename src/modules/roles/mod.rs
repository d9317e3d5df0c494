//! Role catalog and role-level permission grants.

pub mod controller;
pub mod router;
pub mod service;
