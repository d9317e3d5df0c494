//! Permission resolution and the caller's own authorization view.

pub mod controller;
pub mod router;
pub mod service;
