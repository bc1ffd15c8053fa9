//! HTTP handlers.

pub mod check;
pub mod status;

use std::sync::Arc;

use crate::relay::Relay;

pub use check::{check, check_source, CheckResponse};
pub use status::{status_webhook, IncidentResponse};

/// Shared application state.
pub struct AppState {
    /// Dispatcher.
    pub relay: Arc<Relay>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(relay: Arc<Relay>) -> Self {
        Self { relay }
    }
}
