//! Chart specifications for the dashboard.
//!
//! Every builder returns a Vega-Lite document as `serde_json::Value`; the
//! dashboard page hands it to vega-embed unchanged. The graph view is the
//! exception and returns a node/edge model for vis-network.

pub mod bar;
pub mod graph_view;
pub mod map;
pub mod network;

use serde_json::{json, Value};

pub use bar::{
    bubble_chart, distribution_chart, growth_chart, scatter_chart, survival_chart, BarChart,
};
pub use graph_view::{GraphEdge, GraphNode, GraphView};
pub use map::choropleth;
pub use network::neighbour_network;

/// Vega-Lite schema every spec declares.
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Skeleton shared by all specs.
fn base_spec(title: &str) -> Value {
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": title,
        "width": "container",
        "autosize": { "type": "fit", "contains": "padding" }
    })
}

/// Capitalize the first character, as axis labels default to the field name.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
