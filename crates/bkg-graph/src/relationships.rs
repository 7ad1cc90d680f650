//! Edges between already-imported nodes.
//!
//! Every statement MATCHes both endpoints, so a row naming a node that was
//! never imported simply produces no edge.

use std::path::Path;

use bkg_core::dataset::{read_csv, AdjacencyRow, BusinessRow, ContainmentRow};
use bkg_core::BoroughFilter;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::{CypherExecutor, Statement};
use crate::error::GraphResult;
use crate::import::ImportSummary;

/// Regions that sit above Inner/Outer London, independent of any CSV.
pub const FIXED_CONTAINMENT: &[(&str, &str)] = &[
    ("Inner London", "Greater London"),
    ("Outer London", "Greater London"),
];

const CONNECT_LOCATION: &str = "
UNWIND $rows AS row
MATCH (b:Business {osmId: row.osm_id})
MATCH (br:Borough {name: row.area})
MERGE (b)-[:LOCATED_IN]->(br)";

const CONNECT_NEIGHBOURS: &str = "
UNWIND $rows AS row
MATCH (a:Borough {name: row.borough})
MATCH (b:Borough {name: row.neighbour})
MERGE (a)-[:NEIGHBOURS]->(b)
MERGE (b)-[:NEIGHBOURS]->(a)";

const CONNECT_PART_OF: &str = "
UNWIND $rows AS row
MATCH (c:Borough {name: row.borough})
MATCH (p:Borough {name: row.parent})
MERGE (c)-[:PART_OF]->(p)";

/// `LOCATED_IN` from each business to its borough.
pub async fn connect_businesses_to_boroughs(
    exec: &dyn CypherExecutor,
    path: &Path,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    info!("Connecting businesses to boroughs...");
    let rows: Vec<BusinessRow> = read_csv(path)?;
    connect_location_rows(exec, rows, filter).await
}

pub async fn connect_location_rows(
    exec: &dyn CypherExecutor,
    rows: Vec<BusinessRow>,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    let rows_read = rows.len();
    let rows = filter.retain(rows);
    let payload: Vec<Value> = rows
        .iter()
        .filter_map(|r| {
            r.area
                .as_ref()
                .map(|area| json!({ "osm_id": r.osm_id, "area": area }))
        })
        .collect();

    let summary = submit(exec, CONNECT_LOCATION, rows_read, rows.len(), payload).await?;
    info!(edges = summary.rows_submitted, skipped = summary.rows_skipped, "LOCATED_IN relationships created");
    Ok(summary)
}

/// Symmetric `NEIGHBOURS` edges from the adjacency table.
pub async fn connect_neighbouring_boroughs(
    exec: &dyn CypherExecutor,
    path: &Path,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    info!("Connecting neighbouring boroughs...");
    let rows: Vec<AdjacencyRow> = read_csv(path)?;
    connect_adjacency_rows(exec, rows, filter).await
}

/// With an active filter a pair is kept only when both ends are allowed.
pub async fn connect_adjacency_rows(
    exec: &dyn CypherExecutor,
    rows: Vec<AdjacencyRow>,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    let rows_read = rows.len();
    let kept: Vec<&AdjacencyRow> = rows
        .iter()
        .filter(|r| filter.allows(&r.borough) && filter.allows(&r.neighbour))
        .collect();
    let payload: Vec<Value> = kept
        .iter()
        .filter(|r| r.borough != r.neighbour)
        .map(|r| json!({ "borough": r.borough, "neighbour": r.neighbour }))
        .collect();

    let summary = submit(exec, CONNECT_NEIGHBOURS, rows_read, kept.len(), payload).await?;
    info!(pairs = summary.rows_submitted, "NEIGHBOURS relationships created");
    Ok(summary)
}

/// `PART_OF` edges: the fixed London hierarchy, then the CSV mapping.
pub async fn connect_boroughs_to_aggregate(
    exec: &dyn CypherExecutor,
    path: &Path,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    info!("Connecting boroughs to aggregate regions...");
    let rows: Vec<ContainmentRow> = read_csv(path)?;
    connect_containment_rows(exec, rows, filter).await
}

pub async fn connect_containment_rows(
    exec: &dyn CypherExecutor,
    rows: Vec<ContainmentRow>,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    let fixed: Vec<Value> = FIXED_CONTAINMENT
        .iter()
        .map(|(borough, parent)| json!({ "borough": borough, "parent": parent }))
        .collect();
    let n_fixed = fixed.len();
    let mut summary = submit(exec, CONNECT_PART_OF, n_fixed, n_fixed, fixed).await?;

    let rows_read = rows.len();
    let rows = filter.retain(rows);
    let payload: Vec<Value> = rows
        .iter()
        .map(|r| json!({ "borough": r.borough, "parent": r.parent }))
        .collect();
    summary.merge(&submit(exec, CONNECT_PART_OF, rows_read, rows.len(), payload).await?);

    info!(edges = summary.rows_submitted, "PART_OF relationships created");
    Ok(summary)
}

async fn submit(
    exec: &dyn CypherExecutor,
    text: &str,
    rows_read: usize,
    rows_kept: usize,
    payload: Vec<Value>,
) -> GraphResult<ImportSummary> {
    let rows_submitted = payload.len();
    if payload.is_empty() {
        debug!("No relationship rows to submit");
    } else {
        exec.run(Statement::new(text).param("rows", payload)).await?;
    }
    Ok(ImportSummary {
        rows_read,
        rows_kept,
        entities_upserted: 0,
        rows_submitted,
        rows_skipped: rows_kept - rows_submitted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::RecordingExecutor;

    fn pair(a: &str, b: &str) -> AdjacencyRow {
        AdjacencyRow {
            borough: a.to_string(),
            neighbour: b.to_string(),
        }
    }

    #[tokio::test]
    async fn test_location_skips_rows_without_area() {
        let exec = RecordingExecutor::default();
        let rows = vec![
            BusinessRow {
                osm_id: 1,
                name_business: Some("Pub A".into()),
                fclass: Some("pub".into()),
                area: Some("Merton".into()),
            },
            BusinessRow {
                osm_id: 2,
                name_business: None,
                fclass: Some("pub".into()),
                area: None,
            },
        ];
        let summary = connect_location_rows(&exec, rows, &BoroughFilter::all()).await.unwrap();
        assert_eq!(summary.rows_submitted, 1);
        assert_eq!(summary.rows_skipped, 1);
        assert_eq!(
            exec.taken()[0].params["rows"],
            json!([{ "osm_id": 1, "area": "Merton" }])
        );
    }

    #[tokio::test]
    async fn test_adjacency_needs_both_ends_allowed() {
        let exec = RecordingExecutor::default();
        let rows = vec![
            pair("Merton", "Sutton"),
            pair("Merton", "Wandsworth"),
            pair("Camden", "Islington"),
        ];
        let filter = BoroughFilter::only(["Merton", "Sutton"]);
        let summary = connect_adjacency_rows(&exec, rows, &filter).await.unwrap();
        assert_eq!(summary.rows_kept, 1);

        let statements = exec.taken();
        assert_eq!(
            statements[0].params["rows"],
            json!([{ "borough": "Merton", "neighbour": "Sutton" }])
        );
        assert!(statements[0].text.contains("MERGE (a)-[:NEIGHBOURS]->(b)"));
        assert!(statements[0].text.contains("MERGE (b)-[:NEIGHBOURS]->(a)"));
    }

    #[tokio::test]
    async fn test_containment_fixed_pass_ignores_filter() {
        let exec = RecordingExecutor::default();
        let rows = vec![
            ContainmentRow {
                borough: "Merton".into(),
                parent: "Outer London".into(),
            },
            ContainmentRow {
                borough: "Camden".into(),
                parent: "Inner London".into(),
            },
        ];
        let summary = connect_containment_rows(&exec, rows, &BoroughFilter::only(["Merton"]))
            .await
            .unwrap();
        assert_eq!(summary.rows_submitted, 3);

        let statements = exec.taken();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].params["rows"].as_array().unwrap().len(), 2);
        assert_eq!(statements[0].params["rows"][0]["parent"], "Greater London");
        assert_eq!(
            statements[1].params["rows"],
            json!([{ "borough": "Merton", "parent": "Outer London" }])
        );
    }
}
