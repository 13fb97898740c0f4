//! Annotation endpoint.

use axum::{extract::State, Json};
use ontoscan_annotator::{AnnotateOptions, Annotation};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::SharedState;

/// Text plus the annotate options, flattened into one JSON object.
#[derive(Debug, Deserialize)]
pub struct AnnotateRequest {
    pub text: String,
    #[serde(flatten)]
    pub options: AnnotateOptions,
}

/// POST /api/annotator
pub async fn annotate(
    State(state): State<SharedState>,
    Json(req): Json<AnnotateRequest>,
) -> Result<Json<Vec<Annotation>>, ApiError> {
    let annotations = state.annotator.annotate(&req.text, &req.options).await?;
    debug!(chars = req.text.len(), annotations = annotations.len(), "Annotate request served");
    Ok(Json(annotations))
}
