//! HTTP middleware and extractors.
//!
//! The per-request identity chain is implemented as extractors rather
//! than router layers: authenticate (decode bearer token) -> load the
//! user row -> check the blocked flag -> hand the identity to the
//! handler. Any step short-circuits with the matching error response.

pub mod auth;

pub use auth::{RequireRefresh, RequireUser};
