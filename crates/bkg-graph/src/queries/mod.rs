//! Read-only queries over the knowledge graph.
//!
//! Each function runs one parameterized template (or composes a few) and
//! decodes the rows into plain Rust shapes. A failed query is an error,
//! never an empty result.

pub mod boroughs;
pub mod business;
pub mod density;
pub mod explore;
pub mod population;
pub mod survival;

pub use boroughs::{all_boroughs, borough_and_neighbours};
pub use business::{
    all_business_types, business_count_for_all_boroughs, business_count_for_boroughs,
    people_business_ratio,
};
pub use density::{bubble_chart_data, density_for_all_boroughs};
pub use explore::{ensure_read_only, graph_view, preset_table, TablePreset, DEFAULT_GRAPH_QUERY};
pub use population::{
    population_for_boroughs, population_in_range, population_years, YearRange,
};
pub use survival::{survival_rates_for_boroughs, survival_years};

use serde_json::Value;

use crate::client::{CypherExecutor, Record, RecordExt, Statement};
use crate::error::GraphResult;

async fn fetch(exec: &dyn CypherExecutor, statement: Statement) -> GraphResult<Vec<Record>> {
    Ok(exec.query(statement).await?.records)
}

fn names_param(names: &[String]) -> Value {
    Value::from(names.to_vec())
}

/// Decode a single string column from every row.
async fn text_column(exec: &dyn CypherExecutor, text: &str, column: &str) -> GraphResult<Vec<String>> {
    fetch(exec, Statement::new(text))
        .await?
        .iter()
        .map(|r| r.text(column))
        .collect()
}

/// Decode a single integer column from every row, skipping nulls.
async fn int_column(exec: &dyn CypherExecutor, text: &str, column: &str) -> GraphResult<Vec<i64>> {
    let mut values = Vec::new();
    for record in fetch(exec, Statement::new(text)).await? {
        if let Some(v) = record.opt_int(column)? {
            values.push(v);
        }
    }
    Ok(values)
}
