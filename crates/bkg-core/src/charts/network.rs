use serde_json::{json, Value};

use super::base_spec;
use crate::layout::{star_edges, SpringLayout};
use crate::model::BoroughDensity;

const MIN_NODE_SIZE: f64 = 10.0;

/// Star network of a borough and its neighbours.
///
/// The selected borough sits at the hub. Node area follows population
/// (in thousands, never below 10) and colour follows business density.
/// If `selected` is not among `rows` the first row is used as the hub.
pub fn neighbour_network(rows: &[BoroughDensity], selected: &str) -> Option<Value> {
    if rows.is_empty() {
        return None;
    }

    let center = rows.iter().position(|r| r.borough == selected).unwrap_or(0);
    let edges = star_edges(center, rows.len());
    let points = SpringLayout::default().place(rows.len(), &edges);

    let nodes: Vec<Value> = rows
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (row, p))| {
            json!({
                "borough": row.borough,
                "x": p.x,
                "y": p.y,
                "size": (row.population as f64 / 1000.0).max(MIN_NODE_SIZE),
                "population": row.population,
                "business_count": row.business_count,
                "ratio": row.business_to_population_ratio,
                "hub": i == center,
            })
        })
        .collect();

    let links: Vec<Value> = edges
        .iter()
        .map(|&(a, b)| {
            json!({
                "x": points[a].x,
                "y": points[a].y,
                "x2": points[b].x,
                "y2": points[b].y,
            })
        })
        .collect();

    let hidden_axis = json!({ "axis": null, "scale": { "domain": [-1.2, 1.2] } });
    let mut x_axis = hidden_axis.clone();
    x_axis["field"] = json!("x");
    x_axis["type"] = json!("quantitative");
    let mut y_axis = hidden_axis;
    y_axis["field"] = json!("y");
    y_axis["type"] = json!("quantitative");

    let mut spec = base_spec(&format!("Connections of {}", rows[center].borough));
    spec["height"] = json!(450);
    spec["layer"] = json!([
        {
            "data": { "values": links },
            "mark": { "type": "rule", "color": "gray", "opacity": 0.6 },
            "encoding": {
                "x": x_axis,
                "y": y_axis,
                "x2": { "field": "x2" },
                "y2": { "field": "y2" }
            }
        },
        {
            "data": { "values": nodes },
            "mark": { "type": "circle", "stroke": "black", "opacity": 1 },
            "encoding": {
                "x": { "field": "x", "type": "quantitative" },
                "y": { "field": "y", "type": "quantitative" },
                "size": { "field": "size", "type": "quantitative", "legend": null },
                "color": {
                    "field": "ratio",
                    "type": "quantitative",
                    "title": "Businesses per 10k",
                    "scale": { "scheme": "blues" }
                },
                "tooltip": [
                    { "field": "borough", "type": "nominal" },
                    { "field": "population", "type": "quantitative", "format": "," },
                    { "field": "business_count", "type": "quantitative" },
                    { "field": "ratio", "type": "quantitative", "format": ".3f" }
                ]
            }
        },
        {
            "data": { "values": nodes },
            "mark": { "type": "text", "dy": -14, "fontWeight": "bold" },
            "encoding": {
                "x": { "field": "x", "type": "quantitative" },
                "y": { "field": "y", "type": "quantitative" },
                "text": { "field": "borough" }
            }
        }
    ]);
    Some(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(b: &str, pop: i64) -> BoroughDensity {
        BoroughDensity {
            borough: b.to_string(),
            population: pop,
            business_count: 2,
            business_to_population_ratio: 0.5,
        }
    }

    #[test]
    fn test_star_around_selected() {
        let rows = vec![row("Merton", 200_000), row("Sutton", 5_000), row("Wandsworth", 300_000)];
        let spec = neighbour_network(&rows, "Merton").unwrap();

        assert_eq!(spec["title"], "Connections of Merton");
        let links = spec["layer"][0]["data"]["values"].as_array().unwrap();
        assert_eq!(links.len(), 2);

        let nodes = spec["layer"][1]["data"]["values"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["hub"], true);
        assert_eq!(nodes[0]["size"], 200.0);
        assert_eq!(nodes[1]["size"], 10.0);
    }

    #[test]
    fn test_unknown_selection_uses_first() {
        let spec = neighbour_network(&[row("Sutton", 1)], "Camden").unwrap();
        assert_eq!(spec["title"], "Connections of Sutton");
        assert!(neighbour_network(&[], "Camden").is_none());
    }

    #[test]
    fn test_layout_is_stable() {
        let rows = vec![row("A", 1), row("B", 1), row("C", 1), row("D", 1)];
        assert_eq!(neighbour_network(&rows, "B"), neighbour_network(&rows, "B"));
    }
}
