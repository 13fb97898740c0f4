//! Liveness and cache instance status.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub cache_instance: String,
    pub stop_words: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}

/// GET /api/health
pub async fn health(State(state): State<SharedState>) -> Result<Json<Health>, ApiError> {
    let cache_instance = state.term_cache.instances().current().await?;
    Ok(Json(Health {
        status: "ok",
        cache_instance,
        stop_words: state.annotator.stop_words().len(),
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    }))
}
