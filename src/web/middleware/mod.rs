//! Middleware for the HTTP surface.

pub mod secret;

pub use secret::{require_secret, SharedSecret, SECRET_HEADER};
