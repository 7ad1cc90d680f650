//! Business survival rate import.

use std::collections::BTreeSet;
use std::path::Path;

use bkg_core::dataset::{read_csv, SurvivalRow};
use bkg_core::model::SurvivalPeriod;
use bkg_core::{BoroughFilter, SurvivalKey};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{upsert_boroughs, ImportSummary};
use crate::client::{CypherExecutor, Statement};
use crate::error::GraphResult;

/// Keyed by year: boroughs reporting the same year share one node.
const UPSERT_SURVIVAL_BY_YEAR: &str = "
UNWIND $rows AS row
MATCH (b:Borough {name: row.area})
MERGE (bs:BusinessSurvival {year: row.props.year})
SET bs += row.props
MERGE (b)-[:HAS_BUSINESS_SURVIVAL {year: row.props.year}]->(bs)";

const UPSERT_SURVIVAL_BY_BOROUGH_YEAR: &str = "
UNWIND $rows AS row
MATCH (b:Borough {name: row.area})
MERGE (bs:BusinessSurvival {year: row.props.year, borough: row.area})
SET bs += row.props
MERGE (b)-[:HAS_BUSINESS_SURVIVAL {year: row.props.year}]->(bs)";

/// Import `boroughs_business_survival_rate.csv`.
pub async fn import_survival(
    exec: &dyn CypherExecutor,
    path: &Path,
    filter: &BoroughFilter,
    key: SurvivalKey,
) -> GraphResult<ImportSummary> {
    info!(path = %path.display(), ?key, "Importing business survival rate data...");
    let rows: Vec<SurvivalRow> = read_csv(path)?;
    let summary = import_survival_rows(exec, rows, filter, key).await?;
    info!(records = summary.rows_submitted, "Business survival rate data import complete");
    Ok(summary)
}

pub async fn import_survival_rows(
    exec: &dyn CypherExecutor,
    rows: Vec<SurvivalRow>,
    filter: &BoroughFilter,
    key: SurvivalKey,
) -> GraphResult<ImportSummary> {
    let rows_read = rows.len();
    let rows = filter.retain(rows);

    let boroughs: BTreeSet<String> = rows.iter().map(|r| r.area.clone()).collect();
    let entities_upserted = upsert_boroughs(exec, &boroughs).await?;

    if key == SurvivalKey::Year && boroughs.len() > 1 {
        warn!(
            boroughs = boroughs.len(),
            "BusinessSurvival is keyed by year only; boroughs sharing a year share one node"
        );
    }

    let payload: Vec<Value> = rows
        .iter()
        .map(|row| json!({ "area": row.area, "props": survival_props(row) }))
        .collect();

    if !payload.is_empty() {
        let text = match key {
            SurvivalKey::Year => UPSERT_SURVIVAL_BY_YEAR,
            SurvivalKey::BoroughYear => UPSERT_SURVIVAL_BY_BOROUGH_YEAR,
        };
        exec.run(Statement::new(text).param("rows", payload)).await?;
    }

    Ok(ImportSummary {
        rows_read,
        rows_kept: rows.len(),
        entities_upserted,
        rows_submitted: rows.len(),
        rows_skipped: 0,
    })
}

/// Node properties for one row. Missing values are left out entirely so
/// they never show up as null properties.
pub fn survival_props(row: &SurvivalRow) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("year".into(), json!(row.year));
    if let Some(births) = row.births {
        props.insert("births".into(), json!(births));
    }
    for (period, rate) in SurvivalPeriod::ALL.iter().zip(row.rates()) {
        if let Some(rate) = rate {
            props.insert(period.property().into(), json!(rate));
        }
    }
    props
}
