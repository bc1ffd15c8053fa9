//! Polling endpoints for external cron callers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::relay::CycleReport;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Response of a polling endpoint.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub report: CycleReport,
}

impl From<CycleReport> for CheckResponse {
    fn from(report: CycleReport) -> Self {
        Self { ok: true, report }
    }
}

/// ANY / and ANY /check - Poll the source due this minute.
pub async fn check(State(state): State<Arc<AppState>>) -> Result<Json<CheckResponse>, ApiError> {
    let report = state.relay.run_cycle(Utc::now()).await?;
    Ok(Json(report.into()))
}

/// ANY /check/:source - Poll one source by key.
pub async fn check_source(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> Result<Json<CheckResponse>, ApiError> {
    let report = state.relay.check_source(&source).await?;
    Ok(Json(report.into()))
}
