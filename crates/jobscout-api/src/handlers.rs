//! HTTP handlers for the trigger surface.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use jobscout_core::RefreshOutcome;
use jobscout_jobs::RefreshPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RefreshPipeline>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    /// Bypass the freshness gate.
    #[serde(default)]
    pub force: bool,
}

/// `POST /api/refresh` — run one refresh cycle and return its structured
/// outcome. Cycle failures come back as `success: false` payloads, not
/// HTTP errors; the caller inspects the body either way.
pub async fn refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Json<RefreshOutcome> {
    info!(force = params.force, "Refresh triggered via API");
    Json(state.pipeline.run(params.force).await)
}

/// `GET /healthz` — liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}
