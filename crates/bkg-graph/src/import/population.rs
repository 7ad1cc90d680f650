//! Population density import: one `Population` node per borough-year.

use std::collections::BTreeSet;
use std::path::Path;

use bkg_core::dataset::{read_csv, PopulationRow};
use bkg_core::BoroughFilter;
use serde_json::{json, Value};
use tracing::info;

use super::{upsert_boroughs, ImportSummary};
use crate::client::{CypherExecutor, Statement};
use crate::error::GraphResult;

/// The node is merged through its edge so each borough-year gets its own.
const UPSERT_POPULATION: &str = "
UNWIND $rows AS row
MATCH (b:Borough {name: row.name})
MERGE (b)-[:HAS_POPULATION {year: row.year}]->(p:Population {year: row.year})
SET p.source = row.source,
    p.population = row.population,
    p.population_per_sqkm = row.population_per_sqkm";

/// Import `housing_density_borough.csv`.
pub async fn import_population(
    exec: &dyn CypherExecutor,
    path: &Path,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    info!(path = %path.display(), "Importing population density data...");
    let rows: Vec<PopulationRow> = read_csv(path)?;
    let summary = import_population_rows(exec, rows, filter).await?;
    info!(
        boroughs = summary.entities_upserted,
        records = summary.rows_submitted,
        "Population density data import complete"
    );
    Ok(summary)
}

pub async fn import_population_rows(
    exec: &dyn CypherExecutor,
    rows: Vec<PopulationRow>,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    let rows_read = rows.len();
    let rows = filter.retain(rows);

    let boroughs: BTreeSet<String> = rows.iter().map(|r| r.name.clone()).collect();
    let entities_upserted = upsert_boroughs(exec, &boroughs).await?;

    let payload: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "name": row.name,
                "year": row.year,
                "source": row.source,
                "population": row.population,
                "population_per_sqkm": row.population_per_sqkm,
            })
        })
        .collect();

    if !payload.is_empty() {
        exec.run(Statement::new(UPSERT_POPULATION).param("rows", payload))
            .await?;
    }

    Ok(ImportSummary {
        rows_read,
        rows_kept: rows.len(),
        entities_upserted,
        rows_submitted: rows.len(),
        rows_skipped: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::RecordingExecutor;
    use bkg_core::dataset::parse_csv;

    const CSV: &str = "\
Name,Year,Source,Population,Population_per_square_kilometre
Merton,2020,GLA,100000,2660.5
Merton,2021.0,GLA,101000,
Sutton,2020,ONS,,1500
";

    fn rows() -> Vec<PopulationRow> {
        parse_csv(CSV, Path::new("population.csv")).unwrap()
    }

    #[tokio::test]
    async fn test_one_node_per_borough_year() {
        let exec = RecordingExecutor::default();
        let summary = import_population_rows(&exec, rows(), &BoroughFilter::all()).await.unwrap();
        assert_eq!(summary.entities_upserted, 2);
        assert_eq!(summary.rows_submitted, 3);

        let statements = exec.taken();
        assert_eq!(statements.len(), 2);
        assert!(statements[1].text.contains("MERGE (b)-[:HAS_POPULATION {year: row.year}]->(p:Population"));

        let sent = statements[1].params["rows"].as_array().unwrap();
        assert_eq!(sent[0]["population"], 100000);
        assert_eq!(sent[1]["year"], 2021);
        assert_eq!(sent[1]["population_per_sqkm"], Value::Null);
        assert_eq!(sent[2]["population"], Value::Null);
    }

    #[tokio::test]
    async fn test_filtered() {
        let exec = RecordingExecutor::default();
        let summary = import_population_rows(&exec, rows(), &BoroughFilter::only(["Sutton"]))
            .await
            .unwrap();
        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.rows_kept, 1);
        assert_eq!(exec.taken()[0].params["rows"], json!([{"name": "Sutton"}]));
    }
}
