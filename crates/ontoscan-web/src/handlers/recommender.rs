//! Recommendation endpoint.

use axum::{extract::State, Json};
use ontoscan_recommender::Recommendation;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub text: String,
    #[serde(default)]
    pub ontologies: Vec<String>,
    #[serde(default)]
    pub include_classes: bool,
}

/// POST /api/recommender
pub async fn recommend(
    State(state): State<SharedState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let recs = state
        .recommender
        .recommend(&req.text, &req.ontologies, req.include_classes)
        .await?;
    Ok(Json(recs))
}
