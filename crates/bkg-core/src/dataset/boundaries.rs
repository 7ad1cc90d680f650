//! Borough boundary polygons (GeoJSON, WGS84).
//!
//! Features are keyed by the `NAME` property. Only what the choropleth
//! needs is modelled: the raw feature, its name and a label point.

use std::path::Path;

use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Property holding the borough name on each feature.
pub const NAME_PROPERTY: &str = "NAME";

/// A loaded GeoJSON feature collection.
#[derive(Debug, Clone)]
pub struct Boundaries {
    features: Vec<Value>,
}

impl Boundaries {
    /// Load a FeatureCollection from disk.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|e| match e {
            CoreError::Boundaries { reason, .. } => CoreError::Boundaries {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn parse(text: &str) -> CoreResult<Self> {
        let doc: Value = serde_json::from_str(text)?;
        let invalid = |reason: &str| CoreError::Boundaries {
            path: Default::default(),
            reason: reason.to_string(),
        };

        if doc.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(invalid("expected a FeatureCollection"));
        }
        let features = doc
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("missing features array"))?
            .clone();

        Ok(Self { features })
    }

    pub fn features(&self) -> &[Value] {
        &self.features
    }

    /// Borough names in file order.
    pub fn names(&self) -> Vec<String> {
        self.features
            .iter()
            .filter_map(feature_name)
            .map(str::to_string)
            .collect()
    }
}

/// The `NAME` property of a feature.
pub fn feature_name(feature: &Value) -> Option<&str> {
    feature
        .get("properties")
        .and_then(|p| p.get(NAME_PROPERTY))
        .and_then(Value::as_str)
}

/// Label point for a feature: mean of its exterior ring vertices.
///
/// For multipolygons the ring with the most vertices is used. Returns
/// `(longitude, latitude)`.
pub fn label_point(feature: &Value) -> Option<(f64, f64)> {
    let geometry = feature.get("geometry")?;
    let coords = geometry.get("coordinates")?;

    let ring = match geometry.get("type")?.as_str()? {
        "Polygon" => coords.get(0)?.as_array()?,
        "MultiPolygon" => coords
            .as_array()?
            .iter()
            .filter_map(|poly| poly.get(0)?.as_array())
            .max_by_key(|ring| ring.len())?,
        _ => return None,
    };

    let points: Vec<(f64, f64)> = ring
        .iter()
        .filter_map(|p| Some((p.get(0)?.as_f64()?, p.get(1)?.as_f64()?)))
        .collect();
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    Some((sx / n, sy / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(name: &str, x: f64, y: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": { "NAME": name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0]]]
            }
        })
    }

    #[test]
    fn test_parse_and_names() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [square("Merton", 0.0, 0.0), square("Sutton", 2.0, 0.0)]
        });
        let b = Boundaries::parse(&doc.to_string()).unwrap();
        assert_eq!(b.names(), vec!["Merton", "Sutton"]);
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = Boundaries::parse(r#"{"type": "Feature"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Boundaries { .. }));
    }

    #[test]
    fn test_label_point_polygon() {
        let (x, y) = label_point(&square("Merton", 0.0, 0.0)).unwrap();
        assert!((x - 0.5).abs() < 1e-9);
        assert!((y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_label_point_multipolygon_uses_largest_ring() {
        let feature = json!({
            "type": "Feature",
            "properties": { "NAME": "Islands" },
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[10.0, 10.0], [11.0, 10.0], [10.0, 11.0]]],
                    [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]]
                ]
            }
        });
        let (x, y) = label_point(&feature).unwrap();
        assert!((x - 1.0).abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
    }
}
