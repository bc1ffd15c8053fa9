//! Status page webhook.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::status::StatusPayload;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Response after an incident report was posted.
#[derive(Debug, Serialize)]
pub struct IncidentResponse {
    pub ok: bool,
    pub message_id: i64,
}

/// POST /status - Relay an incident update.
///
/// Component-only updates carry no `incident` and get an empty 200.
pub async fn status_webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: StatusPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Invalid status payload: {}", e);
        ApiError::bad_request(format!("Invalid status payload: {}", e))
    })?;

    match state.relay.relay_incident(&payload).await? {
        Some(sent) => Ok(Json(IncidentResponse {
            ok: true,
            message_id: sent.message_id,
        })
        .into_response()),
        None => Ok(().into_response()),
    }
}
