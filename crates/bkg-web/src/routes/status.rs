use axum::{extract::State, Json};
use bkg_graph::GraphCounts;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Status {
    pub connected: bool,
    pub uri: String,
    pub database: String,
    pub counts: Option<GraphCounts>,
}

/// GET /api/status - Always 200; `counts` is null when the graph is
/// unreachable.
pub async fn status(State(state): State<AppState>) -> Json<Status> {
    let counts = if state.client.is_connected() {
        match state.client.counts().await {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(error = %e, "Could not count graph contents");
                None
            }
        }
    } else {
        None
    };

    let config = state.client.config();
    Json(Status {
        connected: state.client.is_connected(),
        uri: config.uri.clone(),
        database: config.database.clone(),
        counts,
    })
}
