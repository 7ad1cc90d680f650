//! Plain query endpoints backing the dashboard selectors and tables.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use bkg_core::model::{BoroughPopulation, SurvivalRates};
use bkg_graph::queries::{self, YearRange};
use serde::Deserialize;

use super::{bad_request, graph_error, split_names, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct YearQuery {
    pub boroughs: Option<String>,
    pub year: i64,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub boroughs: Option<String>,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
}

#[derive(Deserialize)]
pub struct CountQuery {
    pub boroughs: Option<String>,
    pub business_type: String,
}

pub async fn boroughs(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let names = queries::all_boroughs(&state.client).await.map_err(graph_error)?;
    Ok(Json(names))
}

pub async fn business_types(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let types = queries::all_business_types(&state.client)
        .await
        .map_err(graph_error)?;
    Ok(Json(types))
}

pub async fn years(State(state): State<AppState>) -> Result<Json<Vec<i64>>, ApiError> {
    let years = queries::population_years(&state.client).await.map_err(graph_error)?;
    Ok(Json(years))
}

pub async fn survival_years(State(state): State<AppState>) -> Result<Json<Vec<i64>>, ApiError> {
    let years = queries::survival_years(&state.client).await.map_err(graph_error)?;
    Ok(Json(years))
}

/// GET /api/boroughs/{name}/neighbours - The borough first, then its
/// neighbours. Empty for an unknown borough.
pub async fn neighbours(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let names = queries::borough_and_neighbours(&state.client, &name)
        .await
        .map_err(graph_error)?;
    Ok(Json(names))
}

pub async fn population(
    State(state): State<AppState>,
    Query(q): Query<YearQuery>,
) -> Result<Json<BTreeMap<String, i64>>, ApiError> {
    let names = split_names(q.boroughs.as_deref());
    let pops = queries::population_for_boroughs(&state.client, &names, q.year)
        .await
        .map_err(graph_error)?;
    Ok(Json(pops))
}

pub async fn population_range(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Vec<BoroughPopulation>>, ApiError> {
    let defaults = YearRange::default();
    let range = YearRange {
        min_year: q.min_year.unwrap_or(defaults.min_year),
        max_year: q.max_year.unwrap_or(defaults.max_year),
    };
    if range.min_year > range.max_year {
        return Err(bad_request(format!(
            "min_year {} is after max_year {}",
            range.min_year, range.max_year
        )));
    }

    let names = split_names(q.boroughs.as_deref());
    let rows = queries::population_in_range(&state.client, &names, range)
        .await
        .map_err(graph_error)?;
    Ok(Json(rows))
}

/// GET /api/business-counts - Counts for the listed boroughs, or for every
/// borough (zero-filled) when none are listed.
pub async fn business_counts(
    State(state): State<AppState>,
    Query(q): Query<CountQuery>,
) -> Result<Json<BTreeMap<String, i64>>, ApiError> {
    let names = split_names(q.boroughs.as_deref());
    let counts = if names.is_empty() {
        queries::business_count_for_all_boroughs(&state.client, &q.business_type).await
    } else {
        queries::business_count_for_boroughs(&state.client, &names, &q.business_type).await
    }
    .map_err(graph_error)?;
    Ok(Json(counts))
}

pub async fn survival(
    State(state): State<AppState>,
    Query(q): Query<YearQuery>,
) -> Result<Json<Vec<SurvivalRates>>, ApiError> {
    let names = split_names(q.boroughs.as_deref());
    let rows = queries::survival_rates_for_boroughs(&state.client, &names, q.year)
        .await
        .map_err(graph_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct TypeQuery {
    pub business_type: String,
}

pub async fn ratio(
    State(state): State<AppState>,
    Query(q): Query<TypeQuery>,
) -> Result<Json<Vec<bkg_core::model::BusinessPopulation>>, ApiError> {
    let rows = queries::people_business_ratio(&state.client, &q.business_type)
        .await
        .map_err(graph_error)?;
    Ok(Json(rows))
}
