//! Graph view and preset tables.

use axum::{
    extract::{Path, State},
    Json,
};
use bkg_core::charts::GraphView;
use bkg_graph::queries::{self, TablePreset, DEFAULT_GRAPH_QUERY};
use bkg_graph::{GraphError, Record};
use serde::Deserialize;

use super::{bad_request, graph_error, ApiError};
use crate::state::AppState;

const DEFAULT_GRAPH_LIMIT: i64 = 100;

#[derive(Deserialize, Default)]
pub struct GraphRequest {
    pub query: Option<String>,
    pub limit: Option<i64>,
}

/// POST /api/graph - Run a `source, relation, target` query and return the
/// node/edge model. A query the database rejects is the caller's fault.
pub async fn graph(
    State(state): State<AppState>,
    Json(req): Json<GraphRequest>,
) -> Result<Json<GraphView>, ApiError> {
    let cypher = req
        .query
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GRAPH_QUERY.to_string());
    let limit = req.limit.unwrap_or(DEFAULT_GRAPH_LIMIT);

    let records = queries::graph_view(&state.client, &cypher, limit)
        .await
        .map_err(|e| match e {
            GraphError::Query { .. }
            | GraphError::Decode { .. }
            | GraphError::WriteNotAllowed { .. } => bad_request(e),
            other => graph_error(other),
        })?;
    Ok(Json(GraphView::from_relations(&records)))
}

/// GET /api/tables/{preset}
pub async fn table(
    State(state): State<AppState>,
    Path(preset): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let preset: TablePreset = preset.parse().map_err(bad_request)?;
    let rows = queries::preset_table(&state.client, preset)
        .await
        .map_err(graph_error)?;
    Ok(Json(rows))
}
