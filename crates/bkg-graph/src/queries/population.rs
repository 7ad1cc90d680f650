use std::collections::BTreeMap;

use bkg_core::model::BoroughPopulation;
use serde::Deserialize;

use crate::client::{CypherExecutor, RecordExt, Statement};
use crate::error::GraphResult;

use super::{fetch, int_column, names_param};

/// Inclusive year window for population series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct YearRange {
    pub min_year: i64,
    pub max_year: i64,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min_year: 1999,
            max_year: 2050,
        }
    }
}

/// Population per borough in one year. Boroughs without a figure are absent.
pub async fn population_for_boroughs(
    exec: &dyn CypherExecutor,
    names: &[String],
    year: i64,
) -> GraphResult<BTreeMap<String, i64>> {
    let statement = Statement::new(
        "UNWIND $borough_names AS name
         MATCH (b:Borough {name: name})-[:HAS_POPULATION {year: $year}]->(p:Population)
         RETURN b.name AS borough, p.population AS population",
    )
    .param("borough_names", names_param(names))
    .param("year", year);

    let mut out = BTreeMap::new();
    for record in fetch(exec, statement).await? {
        if let Some(population) = record.opt_int("population")? {
            out.insert(record.text("borough")?, population);
        }
    }
    Ok(out)
}

/// `(borough, year, population)` rows inside `range`, ordered by borough
/// then year.
pub async fn population_in_range(
    exec: &dyn CypherExecutor,
    names: &[String],
    range: YearRange,
) -> GraphResult<Vec<BoroughPopulation>> {
    let statement = Statement::new(
        "UNWIND $borough_names AS name
         MATCH (b:Borough {name: name})-[:HAS_POPULATION]->(p:Population)
         WHERE p.year >= $min_year AND p.year <= $max_year AND p.population IS NOT NULL
         RETURN b.name AS borough, p.year AS year, p.population AS population
         ORDER BY borough, year",
    )
    .param("borough_names", names_param(names))
    .param("min_year", range.min_year)
    .param("max_year", range.max_year);

    fetch(exec, statement)
        .await?
        .iter()
        .map(|r| {
            Ok(BoroughPopulation {
                borough: r.text("borough")?,
                year: r.int("year")?,
                population: r.int("population")?,
            })
        })
        .collect()
}

/// Years with population records, ascending.
pub async fn population_years(exec: &dyn CypherExecutor) -> GraphResult<Vec<i64>> {
    int_column(
        exec,
        "MATCH (p:Population) RETURN DISTINCT p.year AS year ORDER BY year",
        "year",
    )
    .await
}
