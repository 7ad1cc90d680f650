use bkg_core::model::SurvivalRates;

use crate::client::{CypherExecutor, RecordExt, Statement};
use crate::error::GraphResult;

use super::{fetch, int_column, names_param};

/// Survival figures per borough for one year. Rates missing from the
/// source are `None`.
pub async fn survival_rates_for_boroughs(
    exec: &dyn CypherExecutor,
    names: &[String],
    year: i64,
) -> GraphResult<Vec<SurvivalRates>> {
    let statement = Statement::new(
        "UNWIND $borough_names AS name
         MATCH (b:Borough {name: name})-[:HAS_BUSINESS_SURVIVAL]->(s:BusinessSurvival)
         WHERE s.year = $year
         RETURN b.name AS borough,
                s.year AS year,
                s.births AS businesses_started,
                s.one_year_rate AS one_year_rate,
                s.two_year_rate AS two_year_rate,
                s.three_year_rate AS three_year_rate,
                s.four_year_rate AS four_year_rate,
                s.five_year_rate AS five_year_rate
         ORDER BY borough",
    )
    .param("borough_names", names_param(names))
    .param("year", year);

    fetch(exec, statement)
        .await?
        .iter()
        .map(|r| {
            Ok(SurvivalRates {
                borough: r.text("borough")?,
                year: r.int("year")?,
                businesses_started: r.opt_int("businesses_started")?,
                one_year_rate: r.opt_float("one_year_rate")?,
                two_year_rate: r.opt_float("two_year_rate")?,
                three_year_rate: r.opt_float("three_year_rate")?,
                four_year_rate: r.opt_float("four_year_rate")?,
                five_year_rate: r.opt_float("five_year_rate")?,
            })
        })
        .collect()
}

/// Years with survival records, ascending.
pub async fn survival_years(exec: &dyn CypherExecutor) -> GraphResult<Vec<i64>> {
    int_column(
        exec,
        "MATCH (s:BusinessSurvival) RETURN DISTINCT s.year AS year ORDER BY year",
        "year",
    )
    .await
}
