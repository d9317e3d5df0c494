//! Per-user navigation trees.

pub mod controller;
pub mod router;
pub mod service;
pub mod tree;
