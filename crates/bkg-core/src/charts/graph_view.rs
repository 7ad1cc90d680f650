//! Node/edge model for the interactive graph explorer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::RelationRecord;

const TYPE_COLOR: &str = "#97C2FC";
const ENTITY_COLOR: &str = "#32BF49";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub label: String,
}

/// Deduplicated nodes and edges, ready for vis-network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    /// Build a view from `source -[relation]-> target` rows.
    ///
    /// Nodes are identified by their full property map, so the same entity
    /// returned on several rows is drawn once.
    pub fn from_relations(records: &[RelationRecord]) -> Self {
        let mut view = GraphView::default();
        let mut seen = HashSet::new();

        for record in records {
            let from = view.add_node(&record.source, &mut seen);
            let to = view.add_node(&record.target, &mut seen);
            view.edges.push(GraphEdge {
                from,
                to,
                label: record.relation.clone(),
            });
        }
        view
    }

    fn add_node(&mut self, props: &Map<String, Value>, seen: &mut HashSet<String>) -> String {
        let id = Value::Object(props.clone()).to_string();
        if seen.insert(id.clone()) {
            self.nodes.push(GraphNode {
                id: id.clone(),
                label: node_label(props),
                title: node_tooltip(props),
                color: node_color(props).to_string(),
            });
        }
        id
    }
}

/// `name`, else `id`, else the whole map.
fn node_label(props: &Map<String, Value>) -> String {
    ["name", "id"]
        .iter()
        .find_map(|key| props.get(*key).map(display_value))
        .unwrap_or_else(|| Value::Object(props.clone()).to_string())
}

/// One `key: value` line per property.
fn node_tooltip(props: &Map<String, Value>) -> String {
    props
        .iter()
        .map(|(k, v)| format!("{}: {}", k, display_value(v)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn node_color(props: &Map<String, Value>) -> &'static str {
    if props.contains_key("type") {
        TYPE_COLOR
    } else {
        ENTITY_COLOR
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
