//! Build trigger.

use axum::{extract::State, http::StatusCode, Json};
use bkg_graph::{build_knowledge_graph, BuildOptions, BuildReport};
use serde::Deserialize;

use super::{graph_error, ApiError};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct BuildRequest {
    /// Allow-list for this build. Empty uses the configured test boroughs.
    #[serde(default)]
    pub boroughs: Vec<String>,
}

/// POST /api/build - Rebuild the graph on a fresh connection. Only one
/// build runs at a time; a second request gets 409.
pub async fn build(
    State(state): State<AppState>,
    Json(req): Json<BuildRequest>,
) -> Result<Json<BuildReport>, ApiError> {
    let Ok(_guard) = state.build_lock.try_lock() else {
        return Err((StatusCode::CONFLICT, "a build is already running".to_string()));
    };

    let mut options = BuildOptions::from_config(&state.config);
    if !req.boroughs.is_empty() {
        options = options.with_boroughs(req.boroughs);
    }

    tracing::info!(boroughs = ?options.filter.names(), "Build requested");
    let report = build_knowledge_graph(&state.graph_config, &options, None)
        .await
        .map_err(graph_error)?;
    Ok(Json(report))
}
