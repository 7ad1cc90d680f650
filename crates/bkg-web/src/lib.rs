//! BKG Web Server
//!
//! Axum-based server for the borough dashboard and its JSON API.

pub mod routes;
pub mod state;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Create the application router.
///
/// Cross-origin callers may only read. The dashboard is served from the same
/// origin, so its POSTs to `/api/graph` and `/api/build` need no CORS grant.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let api_routes = Router::new()
        // Lookups
        .route("/boroughs", get(routes::lookups::boroughs))
        .route("/boroughs/{name}/neighbours", get(routes::lookups::neighbours))
        .route("/business-types", get(routes::lookups::business_types))
        .route("/years", get(routes::lookups::years))
        .route("/survival-years", get(routes::lookups::survival_years))
        .route("/population", get(routes::lookups::population))
        .route("/population/range", get(routes::lookups::population_range))
        .route("/business-counts", get(routes::lookups::business_counts))
        .route("/survival", get(routes::lookups::survival))
        .route("/ratio", get(routes::lookups::ratio))
        // Charts
        .route("/charts/bubble", get(routes::charts::bubble))
        .route("/charts/network", get(routes::charts::network))
        .route("/charts/scatter", get(routes::charts::scatter))
        .route("/charts/growth", get(routes::charts::growth))
        .route("/charts/survival", get(routes::charts::survival))
        .route("/charts/distribution", get(routes::charts::distribution))
        .route("/charts/map", get(routes::charts::map))
        // Exploration
        .route("/graph", post(routes::explore::graph))
        .route("/tables/{preset}", get(routes::explore::table))
        // Pipeline
        .route("/build", post(routes::build::build))
        .route("/status", get(routes::status::status))
        .with_state(state.clone());

    Router::new()
        .route("/", get(routes::dashboard::index))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until it is stopped.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
