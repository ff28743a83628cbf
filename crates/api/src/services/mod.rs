//! Services used by route handlers.

pub mod auth;
pub mod images;
