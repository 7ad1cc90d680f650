use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::base_spec;
use crate::dataset::boundaries::{feature_name, label_point};
use crate::dataset::Boundaries;

/// Choropleth of business density per borough.
///
/// Boroughs whose value is `None` (or missing from `values`) are left off
/// the map. Every drawn borough also gets a name label at its label point.
/// Returns `None` when no borough has a value.
pub fn choropleth(
    boundaries: &Boundaries,
    values: &BTreeMap<String, Option<f64>>,
    business_type: &str,
    year: i64,
) -> Option<Value> {
    let mut shapes = Vec::new();
    let mut labels = Vec::new();

    for feature in boundaries.features() {
        let Some(name) = feature_name(feature) else {
            continue;
        };
        let Some(ratio) = values.get(name).copied().flatten() else {
            continue;
        };

        let mut shaped = feature.clone();
        shaped["properties"]["ratio"] = json!(ratio);
        shapes.push(shaped);

        if let Some((lon, lat)) = label_point(feature) {
            labels.push(json!({ "name": name, "lon": lon, "lat": lat }));
        }
    }

    if shapes.is_empty() {
        return None;
    }

    let legend = format!(
        "Number of {} businesses per 10k people in ({})",
        business_type, year
    );

    let mut spec = base_spec(&format!("{} businesses per 10k people, {}", business_type, year));
    spec["height"] = json!(500);
    spec["projection"] = json!({ "type": "mercator" });
    spec["layer"] = json!([
        {
            "data": { "values": shapes, "format": { "type": "json" } },
            "mark": { "type": "geoshape", "stroke": "black", "strokeWidth": 0.5 },
            "encoding": {
                "color": {
                    "field": "properties.ratio",
                    "type": "quantitative",
                    "title": legend,
                    "scale": { "scheme": "orangered" }
                },
                "tooltip": [
                    { "field": "properties.NAME", "type": "nominal", "title": "Borough" },
                    { "field": "properties.ratio", "type": "quantitative", "title": "Per 10k", "format": ".3f" }
                ]
            }
        },
        {
            "data": { "values": labels },
            "mark": { "type": "text", "fontSize": 8 },
            "encoding": {
                "longitude": { "field": "lon", "type": "quantitative" },
                "latitude": { "field": "lat", "type": "quantitative" },
                "text": { "field": "name" }
            }
        }
    ]);
    Some(spec)
}
