//! Business and business type import.

use std::collections::BTreeSet;
use std::path::Path;

use bkg_core::dataset::{read_csv, BusinessRow};
use bkg_core::BoroughFilter;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{upsert_boroughs, upsert_business_types, ImportSummary};
use crate::client::{CypherExecutor, Statement};
use crate::error::GraphResult;

/// Businesses link to their type in both directions.
const UPSERT_BUSINESSES: &str = "
UNWIND $rows AS row
MATCH (bt:BusinessType {type: row.fclass})
MERGE (b:Business {name: row.name, osmId: row.osm_id})
MERGE (b)-[:OF_TYPE]->(bt)
MERGE (bt)-[:TYPE_FOR]->(b)";

/// Import `businesses_with_boroughs.csv`.
pub async fn import_businesses(
    exec: &dyn CypherExecutor,
    path: &Path,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    info!(path = %path.display(), "Importing business data...");
    let rows: Vec<BusinessRow> = read_csv(path)?;
    let summary = import_business_rows(exec, rows, filter).await?;
    info!(
        kept = summary.rows_kept,
        imported = summary.rows_submitted,
        skipped = summary.rows_skipped,
        "Business data import complete"
    );
    Ok(summary)
}

/// Upsert business types, their boroughs, then the businesses.
///
/// Rows without a business type are skipped. A missing name is stored as
/// the empty string so the `(name, osmId)` identity is never null.
pub async fn import_business_rows(
    exec: &dyn CypherExecutor,
    rows: Vec<BusinessRow>,
    filter: &BoroughFilter,
) -> GraphResult<ImportSummary> {
    let rows_read = rows.len();
    let rows = filter.retain(rows);

    let types: BTreeSet<String> = rows.iter().filter_map(|r| r.fclass.clone()).collect();
    let boroughs: BTreeSet<String> = rows.iter().filter_map(|r| r.area.clone()).collect();

    let mut entities_upserted = upsert_business_types(exec, &types).await?;
    entities_upserted += upsert_boroughs(exec, &boroughs).await?;

    let mut rows_skipped = 0;
    let payload: Vec<Value> = rows
        .iter()
        .filter_map(|row| match &row.fclass {
            Some(fclass) => Some(json!({
                "osm_id": row.osm_id,
                "name": row.name_business.as_deref().unwrap_or(""),
                "fclass": fclass,
            })),
            None => {
                rows_skipped += 1;
                None
            }
        })
        .collect();

    if rows_skipped > 0 {
        warn!(rows_skipped, "Skipped businesses without a business type");
    }

    let rows_submitted = payload.len();
    if !payload.is_empty() {
        exec.run(Statement::new(UPSERT_BUSINESSES).param("rows", payload))
            .await?;
    }

    Ok(ImportSummary {
        rows_read,
        rows_kept: rows.len(),
        entities_upserted,
        rows_submitted,
        rows_skipped,
    })
}
