//! Composite queries feeding the density charts.

use bkg_core::metrics::{density_rows, RatioKind};
use bkg_core::model::{is_aggregate_region, BoroughDensity};

use crate::client::CypherExecutor;
use crate::error::GraphResult;

use super::{
    all_boroughs, borough_and_neighbours, business_count_for_all_boroughs,
    business_count_for_boroughs, population_for_boroughs,
};

/// Density rows for a borough and its neighbours, selected borough first.
pub async fn bubble_chart_data(
    exec: &dyn CypherExecutor,
    borough: &str,
    year: i64,
    business_type: &str,
) -> GraphResult<Vec<BoroughDensity>> {
    let boroughs = borough_and_neighbours(exec, borough).await?;
    if boroughs.is_empty() {
        return Ok(Vec::new());
    }
    let populations = population_for_boroughs(exec, &boroughs, year).await?;
    let counts = business_count_for_boroughs(exec, &boroughs, business_type).await?;
    Ok(density_rows(&boroughs, &populations, &counts, RatioKind::BusinessesPer10k))
}

/// Density rows for every borough, aggregate regions excluded.
pub async fn density_for_all_boroughs(
    exec: &dyn CypherExecutor,
    year: i64,
    business_type: &str,
) -> GraphResult<Vec<BoroughDensity>> {
    let boroughs: Vec<String> = all_boroughs(exec)
        .await?
        .into_iter()
        .filter(|b| !is_aggregate_region(b))
        .collect();
    let populations = population_for_boroughs(exec, &boroughs, year).await?;
    let counts = business_count_for_all_boroughs(exec, business_type).await?;
    Ok(density_rows(&boroughs, &populations, &counts, RatioKind::BusinessesPer10k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::RecordingExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_bubble_data_composes_queries() {
        let exec = RecordingExecutor::default();
        exec.respond(vec![json!({"name": "Merton", "neighbours": ["Sutton"]})]);
        exec.respond(vec![json!({"borough": "Merton", "population": 100000})]);
        exec.respond(vec![json!({"borough": "Merton", "business_count": 1})]);

        let rows = bubble_chart_data(&exec, "Merton", 2020, "pub").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].borough, "Merton");
        assert!((rows[0].business_to_population_ratio - 0.1).abs() < 1e-12);
        assert_eq!(rows[1].borough, "Sutton");
        assert_eq!(rows[1].population, 0);
        assert_eq!(rows[1].business_to_population_ratio, 0.0);
    }

    #[tokio::test]
    async fn test_unknown_borough_short_circuits() {
        let exec = RecordingExecutor::default();
        assert!(bubble_chart_data(&exec, "Atlantis", 2020, "pub").await.unwrap().is_empty());
        assert_eq!(exec.texts().len(), 1);
    }

    #[tokio::test]
    async fn test_all_boroughs_skip_aggregates() {
        let exec = RecordingExecutor::default();
        exec.respond(vec![json!({"name": "Inner London"}), json!({"name": "Merton"})]);
        exec.respond(vec![]);
        exec.respond(vec![
            json!({"borough": "Inner London", "business_count": 9}),
            json!({"borough": "Merton", "business_count": 2}),
        ]);
        let rows = density_for_all_boroughs(&exec, 2020, "pub").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].business_count, 2);
        assert_eq!(exec.taken()[1].params["borough_names"], json!(["Merton"]));
    }
}
