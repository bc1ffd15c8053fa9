//! HTTP surface.
//!
//! Exposes the polling endpoints used by external cron callers, the status
//! page webhook and a health check.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_app, create_router};
pub use server::WebServer;
