use std::collections::BTreeMap;

use bkg_core::model::BusinessPopulation;

use crate::client::{CypherExecutor, Record, RecordExt, Statement};
use crate::error::GraphResult;

use super::{fetch, names_param, text_column};

/// Every business type, alphabetical.
pub async fn all_business_types(exec: &dyn CypherExecutor) -> GraphResult<Vec<String>> {
    text_column(
        exec,
        "MATCH (bt:BusinessType) RETURN bt.type AS type ORDER BY type",
        "type",
    )
    .await
}

/// Businesses of one type per borough. Boroughs with none are absent.
pub async fn business_count_for_boroughs(
    exec: &dyn CypherExecutor,
    names: &[String],
    business_type: &str,
) -> GraphResult<BTreeMap<String, i64>> {
    let statement = Statement::new(
        "UNWIND $borough_names AS name
         MATCH (b:Borough {name: name})<-[:LOCATED_IN]-(bus:Business)-[:OF_TYPE]->(:BusinessType {type: $business_type})
         RETURN b.name AS borough, count(bus) AS business_count",
    )
    .param("borough_names", names_param(names))
    .param("business_type", business_type);

    counts_by_borough(&fetch(exec, statement).await?)
}

/// Businesses of one type for every borough, zero-filled.
pub async fn business_count_for_all_boroughs(
    exec: &dyn CypherExecutor,
    business_type: &str,
) -> GraphResult<BTreeMap<String, i64>> {
    let statement = Statement::new(
        "MATCH (b:Borough)
         OPTIONAL MATCH (b)<-[:LOCATED_IN]-(bus:Business)-[:OF_TYPE]->(:BusinessType {type: $business_type})
         RETURN b.name AS borough, count(bus) AS business_count
         ORDER BY borough",
    )
    .param("business_type", business_type);

    counts_by_borough(&fetch(exec, statement).await?)
}

fn counts_by_borough(records: &[Record]) -> GraphResult<BTreeMap<String, i64>> {
    records
        .iter()
        .map(|r| Ok((r.text("borough")?, r.int("business_count")?)))
        .collect()
}

/// Business count of one type and total recorded population per borough.
///
/// Population is summed over every year on record. Boroughs without any
/// business of the type are left out.
pub async fn people_business_ratio(
    exec: &dyn CypherExecutor,
    business_type: &str,
) -> GraphResult<Vec<BusinessPopulation>> {
    let statement = Statement::new(
        "MATCH (:BusinessType {type: $business_type})-[:TYPE_FOR]->(bus:Business)-[:LOCATED_IN]->(b:Borough)
         WITH b, count(DISTINCT bus) AS business_count
         OPTIONAL MATCH (b)-[:HAS_POPULATION]->(p:Population)
         RETURN b.name AS borough, business_count, coalesce(sum(p.population), 0) AS population
         ORDER BY borough",
    )
    .param("business_type", business_type);

    fetch(exec, statement)
        .await?
        .iter()
        .map(|r| {
            Ok(BusinessPopulation {
                borough: r.text("borough")?,
                business_count: r.int("business_count")?,
                population: r.int("population")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::RecordingExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_counts_are_bound() {
        let exec = RecordingExecutor::default();
        exec.respond(vec![json!({"borough": "Merton", "business_count": 1})]);
        let names = vec!["Merton".to_string(), "Sutton".to_string()];
        let counts = business_count_for_boroughs(&exec, &names, "pub").await.unwrap();

        assert_eq!(counts, BTreeMap::from([("Merton".to_string(), 1)]));
        let statement = &exec.taken()[0];
        assert_eq!(statement.params["business_type"], "pub");
        assert_eq!(statement.params["borough_names"], json!(["Merton", "Sutton"]));
    }

    #[tokio::test]
    async fn test_ratio_type_is_a_parameter() {
        let exec = RecordingExecutor::default();
        exec.respond(vec![json!({"borough": "Merton", "business_count": 2, "population": 500})]);
        let malicious = "pub'}) DETACH DELETE n //";
        let rows = people_business_ratio(&exec, malicious).await.unwrap();

        assert_eq!(rows[0].population, 500);
        let statement = &exec.taken()[0];
        assert!(!statement.text.contains(malicious));
        assert_eq!(statement.params["business_type"], malicious);
    }

    #[tokio::test]
    async fn test_bad_row_is_decode_error() {
        let exec = RecordingExecutor::default();
        exec.respond(vec![json!({"borough": "Merton", "business_count": "many"})]);
        let err = business_count_for_all_boroughs(&exec, "pub").await.unwrap_err();
        assert!(matches!(err, crate::GraphError::Decode { .. }));
    }
}
