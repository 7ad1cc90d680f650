//! CSV to Neo4j node import.
//!
//! Every importer follows the same shape: read the table, apply the region
//! allow-list, upsert the shared entities the rows point at, then upsert
//! the primary nodes in one `UNWIND $rows` statement.

pub mod business;
pub mod population;
pub mod survival;

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::{CypherExecutor, Statement};
use crate::error::GraphResult;

pub use business::{import_business_rows, import_businesses};
pub use population::{import_population, import_population_rows};
pub use survival::{import_survival, import_survival_rows, survival_props};

const UPSERT_BOROUGHS: &str = "
UNWIND $rows AS row
MERGE (:Borough {name: row.name})";

const UPSERT_BUSINESS_TYPES: &str = "
UNWIND $rows AS row
MERGE (:BusinessType {type: row.type})";

/// Counts reported by one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows in the source table.
    pub rows_read: usize,
    /// Rows left after the region allow-list.
    pub rows_kept: usize,
    /// Shared entities (boroughs, business types) upserted first.
    pub entities_upserted: usize,
    /// Rows sent in the primary upsert.
    pub rows_submitted: usize,
    /// Kept rows that could not be imported.
    pub rows_skipped: usize,
}

impl ImportSummary {
    pub fn merge(&mut self, other: &ImportSummary) {
        self.rows_read += other.rows_read;
        self.rows_kept += other.rows_kept;
        self.entities_upserted += other.entities_upserted;
        self.rows_submitted += other.rows_submitted;
        self.rows_skipped += other.rows_skipped;
    }
}

/// Upsert `Borough` nodes by name.
pub async fn upsert_boroughs(exec: &dyn CypherExecutor, names: &BTreeSet<String>) -> GraphResult<usize> {
    upsert_keys(exec, UPSERT_BOROUGHS, "name", names).await
}

/// Upsert `BusinessType` nodes by type.
pub async fn upsert_business_types(
    exec: &dyn CypherExecutor,
    types: &BTreeSet<String>,
) -> GraphResult<usize> {
    upsert_keys(exec, UPSERT_BUSINESS_TYPES, "type", types).await
}

async fn upsert_keys(
    exec: &dyn CypherExecutor,
    text: &str,
    field: &str,
    keys: &BTreeSet<String>,
) -> GraphResult<usize> {
    if keys.is_empty() {
        return Ok(0);
    }
    let rows: Vec<Value> = keys
        .iter()
        .map(|k| {
            let mut row = serde_json::Map::new();
            row.insert(field.to_string(), Value::String(k.clone()));
            Value::Object(row)
        })
        .collect();
    debug!(field, count = rows.len(), "Upserting shared entities");
    exec.run(Statement::new(text).param("rows", rows)).await?;
    Ok(keys.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::RecordingExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_boroughs_batches_once() {
        let exec = RecordingExecutor::default();
        let names = BTreeSet::from(["Sutton".to_string(), "Merton".to_string()]);
        assert_eq!(upsert_boroughs(&exec, &names).await.unwrap(), 2);

        let statements = exec.taken();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].text.contains("MERGE (:Borough {name: row.name})"));
        assert_eq!(
            statements[0].params["rows"],
            json!([{"name": "Merton"}, {"name": "Sutton"}])
        );
    }

    #[tokio::test]
    async fn test_empty_upsert_sends_nothing() {
        let exec = RecordingExecutor::default();
        assert_eq!(upsert_business_types(&exec, &BTreeSet::new()).await.unwrap(), 0);
        assert!(exec.texts().is_empty());
    }

    #[test]
    fn test_summary_merge() {
        let mut total = ImportSummary::default();
        total.merge(&ImportSummary {
            rows_read: 3,
            rows_kept: 2,
            entities_upserted: 1,
            rows_submitted: 2,
            rows_skipped: 0,
        });
        total.merge(&ImportSummary {
            rows_read: 1,
            rows_skipped: 1,
            ..Default::default()
        });
        assert_eq!(total.rows_read, 4);
        assert_eq!(total.rows_skipped, 1);
    }
}
