//! Application state.

use std::sync::Arc;

use bkg_core::AppConfig;
use bkg_graph::{GraphClient, GraphConfig};
use tokio::sync::Mutex;

/// Application state shared across handlers.
///
/// `client` is the long-lived connection used by read endpoints. Builds
/// open their own connection from `graph_config`.
#[derive(Clone)]
pub struct AppState {
    pub client: GraphClient,
    pub graph_config: GraphConfig,
    pub config: Arc<AppConfig>,
    /// Held for the duration of a build so two cannot overlap.
    pub build_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(client: GraphClient, graph_config: GraphConfig, config: AppConfig) -> Self {
        Self {
            client,
            graph_config,
            config: Arc::new(config),
            build_lock: Arc::new(Mutex::new(())),
        }
    }
}
