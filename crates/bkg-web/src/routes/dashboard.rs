//! Dashboard route handler.

use axum::response::{Html, IntoResponse};

const DASHBOARD_HTML: &str = include_str!("../../../../assets/web/index.html");

/// GET / - Serve the dashboard page.
pub async fn index() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}
