//! Shared-secret check for the polling endpoints.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::web::error::ApiError;

/// Request header carrying the shared secret.
pub const SECRET_HEADER: &str = "secret";

/// Expected shared secret. An empty secret disables the check.
#[derive(Clone)]
pub struct SharedSecret {
    digest: Option<[u8; 32]>,
}

impl SharedSecret {
    /// Create from the configured secret.
    pub fn new(secret: &str) -> Self {
        let digest = if secret.is_empty() {
            None
        } else {
            Some(hash(secret.as_bytes()))
        };
        Self { digest }
    }

    /// Whether a secret is configured.
    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    /// Check a presented header value.
    pub fn verify(&self, presented: Option<&[u8]>) -> bool {
        let Some(expected) = &self.digest else {
            return true;
        };
        let Some(presented) = presented else {
            return false;
        };

        let actual = hash(presented);
        expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Reject requests whose `secret` header does not match.
pub async fn require_secret(
    State(secret): State<Arc<SharedSecret>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(SECRET_HEADER)
        .map(|value| value.as_bytes());

    if !secret.verify(presented) {
        tracing::warn!("Rejected {} {}: invalid secret", request.method(), request.uri().path());
        return ApiError::unauthorized("Invalid secret").into_response();
    }

    next.run(request).await
}
