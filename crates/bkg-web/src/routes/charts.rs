//! Chart endpoints. Each returns a Vega-Lite document, or 404 when the
//! selection has no data to draw.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use bkg_core::binning::{histogram, BinMode, MAX_BINS};
use bkg_core::charts;
use bkg_core::dataset::Boundaries;
use bkg_core::metrics::{growth_rates, map_ratios, GrowthYears};
use bkg_core::model::{is_aggregate_region, SurvivalSelection};
use bkg_graph::queries::{self, YearRange};
use serde::Deserialize;
use serde_json::Value;

use super::{bad_request, graph_error, split_names, ApiError};
use crate::state::AppState;

const DEFAULT_BINS: usize = 10;

type ChartResult = Result<Json<Value>, ApiError>;

fn found(spec: Option<Value>) -> ChartResult {
    spec.map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "no data for this selection".to_string()))
}

#[derive(Deserialize)]
pub struct DensityQuery {
    pub borough: String,
    pub year: i64,
    pub business_type: String,
}

/// GET /api/charts/bubble - The borough and its neighbours.
pub async fn bubble(State(state): State<AppState>, Query(q): Query<DensityQuery>) -> ChartResult {
    let rows = queries::bubble_chart_data(&state.client, &q.borough, q.year, &q.business_type)
        .await
        .map_err(graph_error)?;
    found(charts::bubble_chart(&rows))
}

/// GET /api/charts/network - The borough's neighbour graph.
pub async fn network(State(state): State<AppState>, Query(q): Query<DensityQuery>) -> ChartResult {
    let rows = queries::bubble_chart_data(&state.client, &q.borough, q.year, &q.business_type)
        .await
        .map_err(graph_error)?;
    found(charts::neighbour_network(&rows, &q.borough))
}

/// GET /api/charts/scatter - Every borough, the selected one highlighted.
pub async fn scatter(State(state): State<AppState>, Query(q): Query<DensityQuery>) -> ChartResult {
    let rows = queries::density_for_all_boroughs(&state.client, q.year, &q.business_type)
        .await
        .map_err(graph_error)?;
    found(charts::scatter_chart(&rows, &q.borough))
}

#[derive(Deserialize)]
pub struct GrowthQuery {
    pub boroughs: Option<String>,
    pub start: i64,
    pub middle: i64,
    pub end: i64,
}

/// GET /api/charts/growth - Past and projected population growth. Without
/// `boroughs`, every borough is charted.
pub async fn growth(State(state): State<AppState>, Query(q): Query<GrowthQuery>) -> ChartResult {
    let years = GrowthYears::new(q.start, q.middle, q.end).map_err(bad_request)?;

    let mut names = split_names(q.boroughs.as_deref());
    if names.is_empty() {
        names = queries::all_boroughs(&state.client)
            .await
            .map_err(graph_error)?
            .into_iter()
            .filter(|b| !is_aggregate_region(b))
            .collect();
    }

    let range = YearRange {
        min_year: years.start,
        max_year: years.end,
    };
    let rows = queries::population_in_range(&state.client, &names, range)
        .await
        .map_err(graph_error)?;
    found(charts::growth_chart(&growth_rates(&rows, years), names))
}

#[derive(Deserialize)]
pub struct SurvivalQuery {
    pub boroughs: Option<String>,
    pub year: i64,
    pub period: Option<String>,
}

/// GET /api/charts/survival - `period` is `all` (default) or one horizon.
pub async fn survival(State(state): State<AppState>, Query(q): Query<SurvivalQuery>) -> ChartResult {
    let selection: SurvivalSelection = q
        .period
        .as_deref()
        .unwrap_or("all")
        .parse()
        .map_err(bad_request)?;

    let names = split_names(q.boroughs.as_deref());
    let rows = queries::survival_rates_for_boroughs(&state.client, &names, q.year)
        .await
        .map_err(graph_error)?;
    found(charts::survival_chart(&rows, selection, names))
}

#[derive(Deserialize)]
pub struct DistributionQuery {
    pub borough: Option<String>,
    pub year: i64,
    pub business_type: String,
    pub bins: Option<usize>,
    pub mode: Option<String>,
}

/// GET /api/charts/distribution - Histogram of density across boroughs,
/// highlighting the bin holding `borough`.
pub async fn distribution(
    State(state): State<AppState>,
    Query(q): Query<DistributionQuery>,
) -> ChartResult {
    let mode: BinMode = match q.mode.as_deref() {
        Some(m) => m.parse().map_err(bad_request)?,
        None => BinMode::default(),
    };
    let bins = q.bins.unwrap_or(DEFAULT_BINS);
    if !(1..=MAX_BINS).contains(&bins) {
        return Err(bad_request(format!("bins must be between 1 and {}", MAX_BINS)));
    }

    let rows = queries::density_for_all_boroughs(&state.client, q.year, &q.business_type)
        .await
        .map_err(graph_error)?;
    let values: Vec<f64> = rows.iter().map(|r| r.business_to_population_ratio).collect();
    let highlight = q.borough.as_deref().and_then(|name| {
        rows.iter()
            .find(|r| r.borough == name)
            .map(|r| r.business_to_population_ratio)
    });

    let hist = histogram(&values, bins, mode, highlight);
    let title = format!("Distribution of {} businesses per 10k people ({})", q.business_type, q.year);
    found(charts::distribution_chart(
        &hist,
        "Businesses per 10k people",
        "Number of boroughs",
        &title,
    ))
}

#[derive(Deserialize)]
pub struct MapQuery {
    pub year: i64,
    pub business_type: String,
}

/// GET /api/charts/map - Choropleth over the configured boundary file.
pub async fn map(State(state): State<AppState>, Query(q): Query<MapQuery>) -> ChartResult {
    let boroughs: Vec<String> = queries::all_boroughs(&state.client)
        .await
        .map_err(graph_error)?
        .into_iter()
        .filter(|b| !is_aggregate_region(b))
        .collect();
    let populations = queries::population_for_boroughs(&state.client, &boroughs, q.year)
        .await
        .map_err(graph_error)?;
    let counts = queries::business_count_for_all_boroughs(&state.client, &q.business_type)
        .await
        .map_err(graph_error)?;

    let boundaries = Boundaries::load(&state.config.data.boundaries).map_err(|e| {
        tracing::error!(error = %e, "Failed to load borough boundaries");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let values = map_ratios(&boroughs, &populations, &counts);
    found(charts::choropleth(&boundaries, &values, &q.business_type, q.year))
}
