//! Menu and action catalog administration.

pub mod controller;
pub mod router;
pub mod service;
