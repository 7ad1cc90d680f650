//! Bar, scatter and histogram specs.

use serde::Serialize;
use serde_json::{json, Value};

use super::{base_spec, capitalize};
use crate::binning::Histogram;
use crate::metrics::GrowthRate;
use crate::model::{BoroughDensity, SurvivalRates, SurvivalSelection};

/// Generic horizontal bar chart over a list of records.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub x_field: String,
    pub y_field: String,
    pub color_field: String,
    pub title: String,
    pub color_scheme: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub stacked: bool,
    pub category_order: Option<Vec<String>>,
}

impl BarChart {
    pub fn new(x_field: &str, y_field: &str, color_field: &str) -> Self {
        Self {
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            color_field: color_field.to_string(),
            title: String::new(),
            color_scheme: "set1".to_string(),
            x_label: None,
            y_label: None,
            stacked: false,
            category_order: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }

    pub fn stacked(mut self, stacked: bool) -> Self {
        self.stacked = stacked;
        self
    }

    /// Fix the order of the categories on the y axis.
    pub fn order(mut self, categories: Vec<String>) -> Self {
        self.category_order = Some(categories);
        self
    }

    /// Build the spec. `None` when there is nothing to plot.
    pub fn spec<T: Serialize>(&self, rows: &[T]) -> Option<Value> {
        if rows.is_empty() {
            return None;
        }
        let values = serde_json::to_value(rows).ok()?;

        let x_label = self.x_label.clone().unwrap_or_else(|| capitalize(&self.x_field));
        let y_label = self.y_label.clone().unwrap_or_else(|| capitalize(&self.y_field));
        let sort = match &self.category_order {
            Some(order) => json!(order),
            None => json!("-x"),
        };

        let mut encoding = json!({
            "x": { "field": self.x_field, "type": "quantitative", "title": x_label },
            "y": { "field": self.y_field, "type": "nominal", "title": y_label, "sort": sort },
            "color": {
                "field": self.color_field,
                "type": "nominal",
                "title": capitalize(&self.color_field),
                "scale": { "scheme": self.color_scheme }
            },
            "tooltip": [
                { "field": self.y_field, "type": "nominal" },
                { "field": self.color_field, "type": "nominal" },
                { "field": self.x_field, "type": "quantitative", "format": ".2f" }
            ]
        });
        if !self.stacked {
            encoding["yOffset"] = json!({ "field": self.color_field });
        }

        let mut spec = base_spec(&self.title);
        spec["data"] = json!({ "values": values });
        spec["mark"] = json!({ "type": "bar", "stroke": "black", "strokeWidth": 1.5 });
        spec["encoding"] = encoding;
        Some(spec)
    }
}

/// Past vs projected population growth per borough.
pub fn growth_chart(rates: &[GrowthRate], borough_order: Vec<String>) -> Option<Value> {
    BarChart::new("growth_rate", "borough", "period")
        .labels("Growth Rate (%)", "Borough")
        .order(borough_order)
        .spec(rates)
}

#[derive(Serialize)]
struct SurvivalBar<'a> {
    borough: &'a str,
    year: i64,
    period: &'static str,
    survival_rate: f64,
}

/// Survival rates per borough, one bar per selected period.
///
/// Missing rates are left out rather than drawn as zero.
pub fn survival_chart(
    rows: &[SurvivalRates],
    selection: SurvivalSelection,
    borough_order: Vec<String>,
) -> Option<Value> {
    let periods = selection.periods();
    let bars: Vec<SurvivalBar> = rows
        .iter()
        .flat_map(|row| {
            periods.iter().filter_map(move |p| {
                row.rate(*p).map(|rate| SurvivalBar {
                    borough: &row.borough,
                    year: row.year,
                    period: p.label(),
                    survival_rate: rate,
                })
            })
        })
        .collect();

    let mut spec = BarChart::new("survival_rate", "borough", "period")
        .labels("Survival Rate (%)", "Borough")
        .order(borough_order)
        .spec(&bars)?;
    let legend_order: Vec<&str> = periods.iter().map(|p| p.label()).collect();
    spec["encoding"]["color"]["sort"] = json!(legend_order);
    Some(spec)
}

/// Population against business count, with the selected borough called out.
pub fn scatter_chart(rows: &[BoroughDensity], selected: &str) -> Option<Value> {
    if rows.is_empty() {
        return None;
    }
    let values: Vec<Value> = rows
        .iter()
        .map(|r| {
            json!({
                "borough": r.borough,
                "population": r.population,
                "business_count": r.business_count,
                "ratio": r.business_to_population_ratio,
                "selected": r.borough == selected,
            })
        })
        .collect();

    let mut spec = base_spec(&format!("Business density and population ({})", selected));
    spec["data"] = json!({ "values": values });
    spec["layer"] = json!([
        {
            "mark": { "type": "circle", "size": 120, "opacity": 0.8 },
            "encoding": {
                "x": { "field": "population", "type": "quantitative", "title": "Population" },
                "y": { "field": "business_count", "type": "quantitative", "title": "Businesses" },
                "color": {
                    "field": "selected",
                    "type": "nominal",
                    "scale": { "domain": [true, false], "range": ["#d62728", "#1f77b4"] },
                    "legend": null
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
            "mark": { "type": "text", "dy": -10 },
            "encoding": {
                "x": { "field": "population", "type": "quantitative" },
                "y": { "field": "business_count", "type": "quantitative" },
                "text": { "field": "borough" }
            }
        }
    ]);
    Some(spec)
}

/// Neighbourhood bubbles: population vs density, sized by business count.
pub fn bubble_chart(rows: &[BoroughDensity]) -> Option<Value> {
    if rows.is_empty() {
        return None;
    }
    let mut spec = base_spec("Businesses per 10,000 people");
    spec["data"] = json!({ "values": rows });
    spec["mark"] = json!({ "type": "circle", "opacity": 0.7 });
    spec["encoding"] = json!({
        "x": { "field": "population", "type": "quantitative", "title": "Population" },
        "y": {
            "field": "business_to_population_ratio",
            "type": "quantitative",
            "title": "Businesses per 10,000 people"
        },
        "size": { "field": "business_count", "type": "quantitative", "title": "Businesses" },
        "color": { "field": "borough", "type": "nominal", "title": "Borough" },
        "tooltip": [
            { "field": "borough", "type": "nominal" },
            { "field": "population", "type": "quantitative", "format": "," },
            { "field": "business_count", "type": "quantitative" },
            { "field": "business_to_population_ratio", "type": "quantitative", "format": ".3f" }
        ]
    });
    Some(spec)
}

/// Histogram bars with the highlighted bin drawn in a contrasting colour.
pub fn distribution_chart(hist: &Histogram, x_label: &str, y_label: &str, title: &str) -> Option<Value> {
    if hist.bins.is_empty() {
        return None;
    }
    let order: Vec<&str> = hist.bins.iter().map(|b| b.label.as_str()).collect();

    let mut spec = base_spec(title);
    spec["data"] = json!({ "values": hist.bins });
    spec["mark"] = json!({ "type": "bar", "stroke": "black", "strokeWidth": 1 });
    spec["encoding"] = json!({
        "x": { "field": "label", "type": "ordinal", "title": x_label, "sort": order },
        "y": { "field": "count", "type": "quantitative", "title": y_label },
        "color": {
            "field": "highlighted",
            "type": "nominal",
            "scale": { "domain": [true, false], "range": ["#d62728", "#9ecae1"] },
            "legend": null
        },
        "tooltip": [
            { "field": "label", "type": "nominal", "title": x_label },
            { "field": "count", "type": "quantitative", "title": y_label }
        ]
    });
    Some(spec)
}
