//! Route handlers.

pub mod build;
pub mod charts;
pub mod dashboard;
pub mod explore;
pub mod lookups;
pub mod status;

use axum::http::StatusCode;
use bkg_graph::GraphError;

/// Error half of every handler result.
pub type ApiError = (StatusCode, String);

/// 503 when the database is unavailable, 500 otherwise.
pub fn graph_error(e: GraphError) -> ApiError {
    if e.is_unavailable() {
        (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    } else {
        tracing::error!(error = %e, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

pub fn bad_request(msg: impl ToString) -> ApiError {
    (StatusCode::BAD_REQUEST, msg.to_string())
}

/// Split a comma-separated `boroughs` parameter, dropping blanks.
pub fn split_names(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_names() {
        assert_eq!(split_names(Some("Merton, Sutton,,")), vec!["Merton", "Sutton"]);
        assert!(split_names(None).is_empty());
    }

    #[test]
    fn test_graph_error_status() {
        assert_eq!(graph_error(GraphError::Disconnected).0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            graph_error(GraphError::query("RETURN x", "boom")).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
